//! # Storefront Simulator
//!
//! Runs one scripted storefront visit without a browser.
//!
//! ## Session Script
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Load config (TOML + env) and site settings (once)                   │
//! │  2. Mount hero (JSON slides) and promo (static slides) carousels        │
//! │  3. Shopper clicks next, then prev mid-transition (dropped), swipes     │
//! │  4. Shopper opens Quick View, picks size and quantity                   │
//! │  5. Wishlist click while signed out ──► login popup ──► resumed         │
//! │  6. Buy now ──► cart ──► /checkout                                      │
//! │  7. Tear everything down                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```text
//! storefront-sim [CONFIG_PATH]
//! RUST_LOG=storefront_engine=debug storefront-sim
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use storefront_core::{Product, Slide, Swipe};
use storefront_engine::memory::{
    InMemoryCart, InMemoryWishlist, LoginScript, RecordingNavigator, ScriptedAuthGate,
};
use storefront_engine::{
    ActionOutcome, CarouselController, CarouselHandle, CommerceOrchestrator, JsonSettings,
    JsonSlides, Services, SettingsCache, SiteSettings, StaticSlides, StorefrontConfig, ToastCenter,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const HERO_SLIDES: &str = r#"[
    {"imageRef": "hero/autumn.jpg", "title": "Autumn layers",
     "subtitle": "New season", "primaryCta": {"label": "Shop now", "href": "/collections/autumn"}},
    {"imageRef": "hero/trail.jpg", "title": "Built for the trail",
     "primaryCta": {"label": "Explore", "href": "/collections/outdoor"},
     "secondaryCta": {"label": "Lookbook", "href": "/lookbook"}},
    {"imageRef": "hero/sale.jpg", "title": "Up to 40% off",
     "description": "While stock lasts"}
]"#;

const SITE_SETTINGS: &str = r#"{
    "storeName": "Northwind Outfitters",
    "currency": "USD",
    "freeShippingThresholdCents": 7500,
    "announcement": "Free returns through January"
}"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = StorefrontConfig::load_or_default(config_path);
    info!(
        dwell_ms = config.carousel.dwell_ms,
        transition_ms = config.carousel.transition_ms,
        checkout = %config.commerce.checkout_route,
        "Configuration loaded"
    );

    let site: SettingsCache<SiteSettings> = SettingsCache::new(Arc::new(JsonSettings::new(SITE_SETTINGS)));
    let settings = site.get().await?;
    info!(
        store = %settings.store_name,
        currency = %settings.currency,
        announcement = settings.announcement.as_deref().unwrap_or(""),
        "Site settings ready"
    );

    // -------------------------------------------------------------------------
    // Carousels
    // -------------------------------------------------------------------------

    let hero = CarouselController::mount("hero", &JsonSlides::new(HERO_SLIDES), &config.carousel).await?;
    let promo = CarouselController::mount("promo", &StaticSlides::new(promo_slides()), &config.carousel).await?;
    let watcher = watch_slides(&hero);

    let outcome = hero.next().await?;
    info!(?outcome, "Shopper clicked next");
    let outcome = hero.prev().await?;
    info!(?outcome, "Shopper clicked prev mid-transition");

    tokio::time::sleep(config.carousel.transition() + Duration::from_millis(50)).await;
    let outcome = hero.swipe(Swipe::new(320.0, 180.0)).await?;
    info!(?outcome, "Shopper swiped left");

    promo.stop().await?;
    let outcome = promo.jump_to(1).await?;
    info!(?outcome, "Shopper picked promo indicator");

    // -------------------------------------------------------------------------
    // Quick View
    // -------------------------------------------------------------------------

    let toasts = ToastCenter::new(&config.notifications);
    let cart = Arc::new(InMemoryCart::with_latency(Duration::from_millis(250)));
    let navigator = Arc::new(RecordingNavigator::new());
    let auth = Arc::new(ScriptedAuthGate::new(false, LoginScript::Approve(Duration::from_millis(600))));

    let orchestrator = CommerceOrchestrator::new(
        Services {
            auth: auth.clone(),
            cart: cart.clone(),
            wishlist: Arc::new(InMemoryWishlist::with_latency(Duration::from_millis(150))),
            navigator: navigator.clone(),
            notifier: Arc::new(toasts.clone()),
        },
        &config.commerce,
    );

    orchestrator.open_quick_view(parka()).await;
    orchestrator
        .update_selection(|s| {
            s.select_size(Some("M".to_string()));
            s.next_image();
            s.increment()
        })
        .await;

    match orchestrator.toggle_wishlist().await {
        ActionOutcome::LoginRequested(prompt) => {
            info!("Wishlist needs login, popup opened");
            let resumed = prompt.resumed().await;
            info!(?resumed, "Wishlist action resumed after login");
        }
        other => warn!(?other, "Expected a login prompt"),
    }

    let outcome = orchestrator.buy_now().await;
    info!(?outcome, "Buy now finished");
    info!(
        routes = ?navigator.routes(),
        cart_lines = cart.lines().len(),
        subtotal_cents = cart.subtotal_cents(),
        toasts = toasts.active().len(),
        "Session summary"
    );

    // -------------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------------

    orchestrator.dispose().await;
    hero.destroy().await?;
    promo.destroy().await?;
    if let Err(e) = watcher.await {
        warn!(error = %e, "Slide watcher ended abnormally");
    }

    info!("Storefront session complete");
    Ok(())
}

/// Log levels follow `RUST_LOG`; default is INFO with debug for the engine.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront_engine=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

/// Logs every slide change until the carousel is destroyed.
fn watch_slides(handle: &CarouselHandle) -> tokio::task::JoinHandle<()> {
    let mut rx = handle.subscribe();
    let name = handle.name().to_string();
    tokio::spawn(async move {
        let mut last = rx.borrow().current_index;
        while rx.changed().await.is_ok() {
            let snapshot = *rx.borrow_and_update();
            if snapshot.disposed {
                info!(carousel = %name, "Carousel destroyed");
                break;
            }
            if snapshot.current_index != last {
                info!(carousel = %name, from = last, to = snapshot.current_index, "Slide changed");
                last = snapshot.current_index;
            }
        }
    })
}

fn promo_slides() -> Vec<Slide> {
    vec![
        Slide::image("promo/shipping.png").with_title("Free shipping over $75"),
        Slide::image("promo/members.png")
            .with_title("Members save 10%")
            .with_primary_cta("Join", "/account/join"),
    ]
}

fn parka() -> Product {
    Product {
        id: "parka-204".to_string(),
        name: "Ridge Insulated Parka".to_string(),
        price_cents: 18_900,
        images: vec![
            "products/parka/front.jpg".to_string(),
            "products/parka/back.jpg".to_string(),
            "products/parka/detail.jpg".to_string(),
        ],
        colors: vec!["Charcoal".to_string(), "Rust".to_string()],
        sizes: vec!["S".to_string(), "M".to_string(), "L".to_string(), "XL".to_string()],
        stock_left: 6,
        description: Some("Recycled fill, storm hood, two-way zip.".to_string()),
    }
}
