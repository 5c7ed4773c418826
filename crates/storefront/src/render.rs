//! Plain-text rendering for the command-line client.

use std::fmt::Write;

use catalog::{CatalogStatus, Facets, FilteredView};
use checkout::CheckoutReceipt;
use domain::models::{Cart, Order, Profile};

pub fn catalog(status: CatalogStatus, view: &FilteredView, facets: &Facets) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}] {} ({} of {} products)",
        status.label(),
        status.message(),
        view.items.len(),
        view.total
    );
    if !facets.categories.is_empty() {
        let _ = writeln!(out, "categories: {}", facets.categories.join(", "));
    }
    if !facets.brands.is_empty() {
        let _ = writeln!(out, "brands: {}", facets.brands.join(", "));
    }
    for item in &view.items {
        let product = &item.product;
        let _ = writeln!(
            out,
            "#{:<5} {:<28} {:<16} {:<16} {:>10}  stock {:>4} ({:.0}%)",
            product.id.get(),
            product.display_name(),
            product.display_brand(),
            product.display_category(),
            product.display_price().to_string(),
            item.stock.label(),
            item.stock.bar_percent()
        );
    }
    if let Some(message) = view.message {
        let _ = writeln!(out, "{message}");
    }
    out
}

pub fn cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty.\n".to_string();
    }
    let mut out = String::new();
    for line in &cart.items {
        let name = line.product_name.as_deref().unwrap_or("Unnamed product");
        let _ = writeln!(
            out,
            "#{:<5} {:<28} {:>3} x {:>10} = {:>10}",
            line.product_id.get(),
            name,
            line.quantity,
            line.unit_price.to_string(),
            line.line_total.to_string()
        );
    }
    let _ = writeln!(out, "total: {}", cart.total_amount);
    out
}

pub fn order(order: &Order) -> String {
    let placed = order
        .created_at
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut out = format!(
        "Order #{}  {}  {}  placed {}\n",
        order.order_id, order.status, order.total_amount, placed
    );
    for line in &order.items {
        let name = line.product_name.as_deref().unwrap_or("Unnamed product");
        let _ = writeln!(
            out,
            "  #{} {} x{} @ {}",
            line.product_id, name, line.quantity, line.unit_price
        );
    }
    out
}

pub fn orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders yet.\n".to_string();
    }
    orders.iter().map(order).collect()
}

pub fn profile(profile: &Profile) -> String {
    let name = profile.full_name();
    format!(
        "{}\n{}\nphone: {}\n",
        if name.is_empty() { "-" } else { name.as_str() },
        profile.email,
        profile.phone.as_deref().unwrap_or("-")
    )
}

pub fn receipt(receipt: &CheckoutReceipt) -> String {
    let mut out = format!(
        "Payment {} approved for {}.\n",
        receipt.payment.payment_id.as_deref().unwrap_or("-"),
        receipt
            .payment
            .amount
            .map(|amount| amount.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    out.push_str(&order(&receipt.order));
    out
}

#[cfg(test)]
mod tests {
    use common::{Money, OrderId, ProductId};
    use domain::models::{CartLine, OrderStatus};

    use super::*;

    #[test]
    fn test_empty_cart() {
        assert_eq!(cart(&Cart::default()), "Your cart is empty.\n");
    }

    #[test]
    fn test_cart_lines_and_total() {
        let rendered = cart(&Cart {
            user_id: None,
            items: vec![CartLine {
                product_id: ProductId::new(3),
                product_name: None,
                quantity: 2,
                unit_price: Money::from_cents(1250),
                line_total: Money::from_cents(2500),
            }],
            total_amount: Money::from_cents(2500),
        });
        assert!(rendered.contains("Unnamed product"));
        assert!(rendered.ends_with("total: $25.00\n"));
    }

    #[test]
    fn test_orders_render_in_given_order() {
        let make = |id| Order {
            order_id: OrderId::new(id),
            status: OrderStatus::new(OrderStatus::PLACED),
            total_amount: Money::from_cents(500),
            created_at: None,
            items: Vec::new(),
        };
        let rendered = orders(&[make(5), make(3)]);
        let first = rendered.find("#5").unwrap();
        let second = rendered.find("#3").unwrap();
        assert!(first < second);
        assert_eq!(orders(&[]), "No orders yet.\n");
    }
}
