use cart_store::{validate_price, CartStore, Change, Hydration, KeyValueStore, Product};

pub type Result = std::result::Result<(), Box<dyn std::error::Error>>;

/// `cart show`: List the line items in the cart.
pub fn show<S: KeyValueStore>(cart: &CartStore<S>) -> Result {
    let products = cart.products();

    if products.is_empty() {
        println!("  (empty cart)");
        return Ok(());
    }

    println!(
        "  {:<16} {:<24} {:>6} {:>10}",
        "Id", "Title", "Qty", "Unit price"
    );
    println!("  {}", "-".repeat(59));

    for item in products.iter() {
        println!(
            "  {:<16} {:<24} {:>6} {:>10.2}",
            truncate(item.id(), 16),
            truncate(item.title(), 24),
            item.quantity(),
            item.price(),
        );
    }

    println!("  {}", "-".repeat(59));
    println!(
        "  {:<16} {:<24} {:>6}",
        "Units",
        "",
        products.total_quantity()
    );

    Ok(())
}

/// `cart add <id>`: Add a product or one more unit of it.
pub async fn add<S: KeyValueStore>(
    cart: &CartStore<S>,
    id: &str,
    title: &str,
    image_url: &str,
    price: f64,
) -> Result {
    let product = Product::new(id, title, image_url, price)?;
    let change = cart.add_to_cart(product).await;
    report(cart, id, change).await
}

/// `cart inc <id>`: Add one unit to a line item.
pub async fn inc<S: KeyValueStore>(cart: &CartStore<S>, id: &str) -> Result {
    let change = cart.increment(id).await;
    report(cart, id, change).await
}

/// `cart dec <id>`: Remove one unit from a line item.
pub async fn dec<S: KeyValueStore>(cart: &CartStore<S>, id: &str) -> Result {
    let change = cart.decrement(id).await;
    report(cart, id, change).await
}

/// `cart clear`: Empty the cart.
pub async fn clear<S: KeyValueStore>(cart: &CartStore<S>) -> Result {
    let change = cart.clear().await;
    report(cart, "*", change).await
}

/// `cart export`: Print the stored snapshot.
pub async fn export<S: KeyValueStore>(cart: &CartStore<S>, pretty: bool) -> Result {
    let key = cart.config().snapshot_key.as_str();
    let Some(raw) = cart.backend().get(key).await? else {
        eprintln!("No snapshot stored under '{key}'");
        println!("[]");
        return Ok(());
    };

    if pretty {
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{raw}");
    }

    Ok(())
}

/// `cart status`: Show backend and snapshot statistics.
pub async fn status<S: KeyValueStore>(cart: &CartStore<S>, label: &str) -> Result {
    let key = cart.config().snapshot_key.as_str();
    let keys = cart.backend().keys().await?;
    let snapshot = cart.backend().get(key).await?;
    let products = cart.products();

    println!("Database: {label}");
    println!("Keys: {}", keys.len());
    for k in &keys {
        let marker = if k == key { " (cart)" } else { "" };
        println!("  {k}{marker}");
    }
    println!();

    match snapshot {
        Some(raw) => println!("Snapshot: {key}, {}", format_bytes(raw.len() as u64)),
        None => println!("Snapshot: {key}, not stored"),
    }
    println!("Hydration: {}", describe_hydration(cart.hydration()));
    println!("Line items: {}", products.len());
    println!("Units: {}", products.total_quantity());

    Ok(())
}

async fn report<S: KeyValueStore>(cart: &CartStore<S>, id: &str, change: Change) -> Result {
    println!("{}", describe_change(id, change));

    // A failed write has already been retried and logged; make it fatal here.
    cart.flush().await?;
    Ok(())
}

fn describe_change(id: &str, change: Change) -> String {
    match change {
        Change::Added => format!("added '{id}' (qty 1)"),
        Change::Incremented { quantity } => format!("'{id}' now qty {quantity}"),
        Change::Decremented { quantity } => format!("'{id}' now qty {quantity}"),
        Change::Removed => format!("removed '{id}'"),
        Change::Cleared { removed } => format!("cleared {removed} line item(s)"),
        Change::Unchanged => format!("'{id}' is not in the cart; nothing changed"),
    }
}

fn describe_hydration(hydration: &Hydration) -> String {
    match hydration {
        Hydration::Restored { items } => format!("restored {items} line item(s)"),
        Hydration::Empty => "no snapshot, started empty".to_string(),
        Hydration::Discarded { reason } => format!("snapshot discarded ({reason})"),
    }
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Parse a `--price` argument, rejecting values a snapshot cannot hold.
pub fn parse_price(s: &str) -> std::result::Result<f64, String> {
    let price: f64 = s.parse().map_err(|e| format!("{e}"))?;
    validate_price(price).map_err(|e| e.to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
