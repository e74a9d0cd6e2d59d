use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Cart;

pub const SESSION_COOKIE: &str = "cart_session";

/// Session identity for the current request, minted or restored by the
/// session middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub Uuid);

/// In-memory session-keyed cart storage. Carts live for the session cookie's
/// lifetime; a session without a cart reads as an empty cart.
#[derive(Clone, Default)]
pub struct CartStore {
    carts: Arc<RwLock<HashMap<Uuid, Cart>>>,
}

impl CartStore {
    pub async fn get(&self, session: SessionId) -> Cart {
        self.carts
            .read()
            .await
            .get(&session.0)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn put(&self, session: SessionId, cart: Cart) {
        self.carts.write().await.insert(session.0, cart);
    }

    pub async fn clear(&self, session: SessionId) {
        self.carts.write().await.remove(&session.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use chrono::Utc;
    use rust_decimal::dec;

    #[tokio::test]
    async fn carts_are_isolated_per_session() {
        let store = CartStore::default();
        let a = SessionId(Uuid::new_v4());
        let b = SessionId(Uuid::new_v4());

        let product = Product {
            id: 1,
            name: "Pickaxe".to_string(),
            description: None,
            price: dec!(12.50),
            image_url: None,
            stock_quantity: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut cart = store.get(a).await;
        cart.add_line(&product, 2);
        store.put(a, cart).await;

        assert_eq!(store.get(a).await.state().total_items, 2);
        assert!(store.get(b).await.is_empty());

        store.clear(a).await;
        assert!(store.get(a).await.is_empty());
    }
}
