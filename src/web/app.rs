// src/web/app.rs
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, Result};
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use log::info;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::{AuctionId, DomainError, ErrorKind};
use crate::engine::{AuctionEngine, CreateOrigin};
use crate::events::EventBus;
use crate::persistence::{InMemoryAuctionStore, InMemoryCarCatalog, InMemoryQuotaStore};
use crate::scheduler::{spawn_sweeper, DEFAULT_SWEEP_INTERVAL};

use super::types::{
    ApiError, AppState, AuctionDetail, AuctionItem, BidRequest, Caller, CreateAuctionRequest, Role,
};

// Initialize application state with in-memory stores
pub fn init_app_state() -> AppState {
    let cars = Arc::new(InMemoryCarCatalog::new());
    let quotas = Arc::new(InMemoryQuotaStore::new());
    let engine = AuctionEngine::new(
        Arc::new(InMemoryAuctionStore::new()),
        cars.clone(),
        quotas.clone(),
        EventBus::default(),
    );
    AppState {
        engine,
        cars,
        quotas,
    }
}

// Read x-jwt-payload header and extract caller identity
fn get_auth_caller(req: &HttpRequest) -> Option<Caller> {
    let auth_header = req.headers().get("x-jwt-payload")?;
    let auth_str = auth_header.to_str().ok()?;

    let decoded = general_purpose::STANDARD.decode(auth_str).ok()?;
    let json_str = String::from_utf8(decoded).ok()?;
    let json: Value = serde_json::from_str(&json_str).ok()?;

    let user_id = json.get("sub")?.as_str()?.parse().ok()?;
    let role = match json.get("role")?.as_str()? {
        "buyer" => Role::Buyer,
        "seller" => Role::Seller,
        "admin" => Role::Admin,
        _ => return None,
    };

    Some(Caller { user_id, role })
}

// Middleware to require authentication
async fn with_auth<F>(req: HttpRequest, f: F) -> Result<HttpResponse>
where
    F: FnOnce(Caller) -> Result<HttpResponse>,
{
    match get_auth_caller(&req) {
        Some(caller) => f(caller),
        None => Ok(HttpResponse::Unauthorized().body("Unauthorized")),
    }
}

fn error_response(err: DomainError) -> HttpResponse {
    let body = ApiError {
        message: err.to_string(),
    };
    match err.kind() {
        ErrorKind::Validation => HttpResponse::BadRequest().json(body),
        ErrorKind::Conflict => HttpResponse::Conflict().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Transient => HttpResponse::ServiceUnavailable().json(body),
    }
}

// Get all auctions
async fn get_auctions(data: web::Data<AppState>) -> Result<HttpResponse> {
    match data.engine.auctions() {
        Ok(auctions) => {
            let items: Vec<AuctionItem> = auctions.iter().map(AuctionItem::from).collect();
            Ok(HttpResponse::Ok().json(items))
        }
        Err(err) => Ok(error_response(err)),
    }
}

// Get auction by ID
async fn get_auction(
    path: web::Path<AuctionId>,
    data: web::Data<AppState>,
) -> Result<HttpResponse> {
    let auction_id = path.into_inner();
    match data.engine.auction(auction_id) {
        Ok(Some(auction)) => Ok(HttpResponse::Ok().json(AuctionDetail::from(&auction))),
        Ok(None) => Ok(error_response(DomainError::UnknownAuction(auction_id))),
        Err(err) => Ok(error_response(err)),
    }
}

// Create a new auction for an approved car
async fn create_auction(
    req: HttpRequest,
    auction_req: web::Json<CreateAuctionRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse> {
    with_auth(req, |caller| {
        let origin = match caller.role {
            Role::Seller => CreateOrigin::Seller(caller.user_id),
            Role::Admin => CreateOrigin::Admin,
            Role::Buyer => {
                return Ok(HttpResponse::Forbidden().json(ApiError {
                    message: "Buyers cannot create auctions".to_string(),
                }))
            }
        };
        match data.engine.create_auction(origin, auction_req.to_params()) {
            Ok(auction) => Ok(HttpResponse::Created().json(AuctionItem::from(&auction))),
            Err(err) => Ok(error_response(err)),
        }
    })
    .await
}

// Place a bid on an active auction
async fn place_bid(
    req: HttpRequest,
    path: web::Path<AuctionId>,
    bid_req: web::Json<BidRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse> {
    let auction_id = path.into_inner();
    with_auth(req, |caller| {
        let now = Utc::now();
        match data
            .engine
            .place_bid(auction_id, caller.user_id, bid_req.amount, now)
        {
            Ok(bid) => Ok(HttpResponse::Ok().json(bid)),
            Err(err) => Ok(error_response(err)),
        }
    })
    .await
}

// Configure routes
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .route("/auctions", web::get().to(get_auctions))
            .route("/auctions/{id}", web::get().to(get_auction))
            .route("/auctions", web::post().to(create_auction))
            .route("/auctions/{id}/bids", web::post().to(place_bid)),
    );
}

// Main application
pub async fn run_app(port: u16) -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let app_state = init_app_state();

    spawn_sweeper(app_state.engine.clone(), DEFAULT_SWEEP_INTERVAL);

    // Log lifecycle events the way a socket gateway would consume them
    let mut events = app_state.engine.events().subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => info!("event: {}", json),
                    Err(err) => info!("event (unserializable): {}", err),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    info!("Starting server on port {}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(Logger::default())
            .configure(configure_app)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}
