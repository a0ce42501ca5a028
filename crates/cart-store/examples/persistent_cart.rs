//! # Persistent cart: two sessions over one SQLite file
//!
//! The first session fills a cart; the second reopens the same database
//! and picks up exactly where the first left off.
//!
//! Run: `cargo run -p cart-store --features sqlite --example persistent_cart`

use cart_store::{CartStore, KeyValueStore, Product, SqliteStore};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("=== Persistent Cart Example ===\n");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cart.db");

    // ── Session 1 ───────────────────────────────────────────────────
    println!("1. First session adds a few products...");
    {
        let cart = CartStore::open(SqliteStore::open(&path).unwrap()).await;
        println!("   Hydration: {:?}", cart.hydration());

        let mug = Product::new("mug", "Coffee mug", "https://img/mug.png", 12.5).unwrap();
        let tee = Product::new("tee", "T-shirt", "https://img/tee.png", 20.0).unwrap();

        println!("   add mug   -> {:?}", cart.add_to_cart(mug.clone()).await);
        println!("   add mug   -> {:?}", cart.add_to_cart(mug).await);
        println!("   add tee   -> {:?}", cart.add_to_cart(tee).await);
        println!("   dec tee   -> {:?}", cart.decrement("tee").await);
        println!("   inc ghost -> {:?}", cart.increment("ghost").await);

        let raw = cart.backend().get("@Cart").await.unwrap().unwrap();
        println!("   Stored snapshot: {raw}");
    }

    // ── Session 2 ───────────────────────────────────────────────────
    println!("\n2. Second session reopens the same file...");
    let cart = CartStore::open(SqliteStore::open(&path).unwrap()).await;
    println!("   Hydration: {:?}", cart.hydration());

    for item in cart.products().iter() {
        println!(
            "   {:<6} {:<12} x{} @ {:.2}",
            item.id(),
            item.title(),
            item.quantity(),
            item.price()
        );
    }
    println!("   Units in cart: {}", cart.products().total_quantity());

    println!("\n=== Done ===");
}
