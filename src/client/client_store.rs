// src/client/client_store.rs

//! Cart and session state for a storefront UI.
//!
//! `ClientStore` is handed to UI handlers explicitly instead of living in
//! globals. It reads `cart` and `currentUser` from the injected `Storage` at
//! construction and writes the affected key after every mutation.

use bigdecimal::{BigDecimal, ToPrimitive};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::client_structs::{CartLine, Notice, PendingCheckout, Redirect, Session};
use super::storage::{Storage, StorageError};
use crate::orders::orders_structs::{CartItemPayload, CheckoutRequest, ShippingInfo};
use crate::shared::shared_structs::MessageResponse;
use crate::users::users_structs::LoginResponse;

pub const CART_KEY: &str = "cart";
pub const SESSION_KEY: &str = "currentUser";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Your cart is empty. Please add items to proceed.")]
    EmptyCart,
    #[error("You must be logged in to complete your order.")]
    NotSignedIn,
    #[error("Quantity must be a whole number of at least 1.")]
    InvalidQuantity,
    #[error("could not encode {key}: {source}")]
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// How the UI should surface this failure.
    pub fn to_notice(&self) -> Notice {
        match self {
            Self::NotSignedIn => Notice::login_required(self.to_string()),
            Self::EmptyCart | Self::InvalidQuantity => Notice::error(self.to_string()),
            Self::Encode { .. } | Self::Storage(_) => {
                Notice::error("Could not save your changes. Please try again.")
            }
        }
    }
}

pub struct ClientStore<S> {
    storage: S,
    cart: Vec<CartLine>,
    session: Option<Session>,
}

impl<S: Storage> ClientStore<S> {
    /// Load persisted state. Unreadable entries are discarded so a corrupt
    /// cart never locks the shopper out.
    pub fn load(storage: S) -> Result<Self, ClientError> {
        let cart = load_entry(&storage, CART_KEY)?.unwrap_or_default();
        let session = load_entry(&storage, SESSION_KEY)?;
        Ok(Self {
            storage,
            cart,
            session,
        })
    }

    pub fn cart(&self) -> &[CartLine] {
        &self.cart
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> i64 {
        self.cart.iter().map(|line| i64::from(line.quantity)).sum()
    }

    /// Display total from the price snapshots.
    pub fn total(&self) -> BigDecimal {
        let mut total = BigDecimal::from(0);
        for line in &self.cart {
            total += &line.price * &BigDecimal::from(line.quantity);
        }
        total
    }

    /// Add `quantity` of a product, merging with an existing line.
    pub fn add_item(
        &mut self,
        product_id: i32,
        name: &str,
        price: BigDecimal,
        quantity: i32,
    ) -> Result<Notice, ClientError> {
        if quantity < 1 {
            return Err(ClientError::InvalidQuantity);
        }

        let mut cart = self.cart.clone();
        match cart.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or(ClientError::InvalidQuantity)?;
            }
            None => cart.push(CartLine {
                product_id,
                name: name.to_string(),
                price,
                quantity,
            }),
        }
        self.commit_cart(cart)?;

        Ok(Notice::success(format!("{quantity} x {name} added to cart.")))
    }

    pub fn remove_item(&mut self, product_id: i32) -> Result<Notice, ClientError> {
        let mut cart = self.cart.clone();
        cart.retain(|line| line.product_id != product_id);
        self.commit_cart(cart)?;
        Ok(Notice::info("Item removed from cart."))
    }

    pub fn clear_cart(&mut self) -> Result<(), ClientError> {
        self.commit_cart(Vec::new())
    }

    pub fn sign_in(&mut self, login: LoginResponse) -> Result<Notice, ClientError> {
        let session = Session {
            id: login.user.id,
            fullname: login.user.fullname,
            email: login.user.email,
            token: login.token,
        };
        let encoded = encode(SESSION_KEY, &session)?;
        self.storage.write(SESSION_KEY, &encoded)?;
        self.session = Some(session);
        Ok(Notice::success("Login successful!").then(Redirect::Home))
    }

    pub fn sign_out(&mut self) -> Result<Notice, ClientError> {
        self.storage.remove(SESSION_KEY)?;
        self.session = None;
        Ok(Notice::info("You have been logged out."))
    }

    /// Build the checkout request. Fails locally, without a round trip,
    /// when the cart is empty or nobody is signed in.
    pub fn checkout_request(&self, shipping: ShippingInfo) -> Result<PendingCheckout, ClientError> {
        if self.cart.is_empty() {
            return Err(ClientError::EmptyCart);
        }
        let session = self.session.as_ref().ok_or(ClientError::NotSignedIn)?;

        let cart_items = self
            .cart
            .iter()
            .map(|line| CartItemPayload {
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.price.to_f64(),
            })
            .collect();

        Ok(PendingCheckout {
            bearer_token: session.token.clone(),
            body: CheckoutRequest {
                cart_items,
                shipping_info: Some(shipping),
            },
        })
    }

    /// Apply the server's answer to a checkout.
    ///
    /// Only a 2xx clears the cart. A 401 or 403 means the stored token is
    /// no longer usable, so the session is dropped and the shopper is sent
    /// to log in; the cart survives for the retry.
    pub fn finish_checkout(&mut self, status: u16, body: &str) -> Result<Notice, ClientError> {
        match status {
            200..=299 => {
                self.clear_cart()?;
                Ok(Notice::success("Order placed successfully!").then(Redirect::Home))
            }
            401 | 403 => {
                self.sign_out()?;
                Ok(Notice::login_required(
                    "Your session has expired. Please log in again.",
                ))
            }
            _ => {
                let message = serde_json::from_str::<MessageResponse>(body)
                    .map(|m| m.message)
                    .unwrap_or_else(|_| "Checkout failed.".to_string());
                Ok(Notice::error(message))
            }
        }
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Write `cart` to storage, then adopt it. A failed write leaves the
    /// in-memory cart as it was.
    fn commit_cart(&mut self, cart: Vec<CartLine>) -> Result<(), ClientError> {
        let encoded = encode(CART_KEY, &cart)?;
        self.storage.write(CART_KEY, &encoded)?;
        self.cart = cart;
        Ok(())
    }
}

fn encode<T: Serialize>(key: &'static str, value: &T) -> Result<String, ClientError> {
    serde_json::to_string(value).map_err(|source| ClientError::Encode { key, source })
}

fn load_entry<S, T>(storage: &S, key: &str) -> Result<Option<T>, ClientError>
where
    S: Storage,
    T: DeserializeOwned,
{
    let Some(raw) = storage.read(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unreadable client state");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::client_structs::NoticeKind;
    use crate::client::storage::MemoryStorage;
    use std::io;
    use crate::users::users_structs::UserSummary;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn login() -> LoginResponse {
        LoginResponse {
            message: "Login successful".into(),
            user: UserSummary {
                id: 7,
                fullname: "Ada".into(),
                email: "ada@x.com".into(),
            },
            token: "tok".into(),
        }
    }

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            fullname: "Ada".into(),
            address: "1 Main St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip: "62701".into(),
        }
    }

    fn store() -> ClientStore<MemoryStorage> {
        ClientStore::load(MemoryStorage::new()).unwrap()
    }

    #[test]
    fn test_add_merges_by_product() {
        let mut store = store();
        store.add_item(1, "Vintage Camera", dec("120.00"), 1).unwrap();
        let notice = store.add_item(1, "Vintage Camera", dec("120.00"), 2).unwrap();
        store.add_item(5, "Mug", dec("18.00"), 1).unwrap();

        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.text, "2 x Vintage Camera added to cart.");
        assert_eq!(store.cart().len(), 2);
        assert_eq!(store.cart()[0].quantity, 3);
        assert_eq!(store.item_count(), 4);
        assert_eq!(store.total(), dec("378.00"));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut store = store();
        assert!(matches!(
            store.add_item(1, "Camera", dec("1.00"), 0),
            Err(ClientError::InvalidQuantity)
        ));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_merge_overflow_rejected() {
        let mut store = store();
        store.add_item(1, "Camera", dec("120.00"), i32::MAX).unwrap();

        assert!(matches!(
            store.add_item(1, "Camera", dec("120.00"), 1),
            Err(ClientError::InvalidQuantity)
        ));
        assert_eq!(store.cart()[0].quantity, i32::MAX);

        let reloaded = ClientStore::load(store.into_storage()).unwrap();
        assert_eq!(reloaded.cart()[0].quantity, i32::MAX);
    }

    /// Storage that accepts reads and refuses writes once sealed.
    #[derive(Default)]
    struct SealableStorage {
        inner: MemoryStorage,
        sealed: bool,
    }

    impl Storage for SealableStorage {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.read(key)
        }

        fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.sealed {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
            }
            self.inner.write(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            if self.sealed {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
            }
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_write_leaves_state_unchanged() {
        let mut store = ClientStore::load(SealableStorage::default()).unwrap();
        store.sign_in(login()).unwrap();
        store.add_item(1, "Camera", dec("120.00"), 1).unwrap();
        store.storage.sealed = true;

        assert!(matches!(
            store.add_item(1, "Camera", dec("120.00"), 2),
            Err(ClientError::Storage(_))
        ));
        assert!(store.add_item(2, "Journal", dec("25.50"), 1).is_err());
        assert!(store.remove_item(1).is_err());
        assert!(store.clear_cart().is_err());
        assert!(store.sign_out().is_err());

        assert_eq!(store.cart().len(), 1);
        assert_eq!(store.cart()[0].quantity, 1);
        assert!(store.session().is_some());

        let persisted = store.into_storage().inner;
        let reloaded = ClientStore::load(persisted).unwrap();
        assert_eq!(reloaded.cart(), store_cart_of_one().as_slice());
    }

    fn store_cart_of_one() -> Vec<CartLine> {
        vec![CartLine {
            product_id: 1,
            name: "Camera".into(),
            price: dec("120.00"),
            quantity: 1,
        }]
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let mut store = store();
        store.add_item(1, "Camera", dec("120.00"), 2).unwrap();
        store.add_item(2, "Journal", dec("25.50"), 1).unwrap();
        store.remove_item(2).unwrap();
        store.sign_in(login()).unwrap();

        let reloaded = ClientStore::load(store.into_storage()).unwrap();
        assert_eq!(reloaded.cart().len(), 1);
        assert_eq!(reloaded.cart()[0].product_id, 1);
        assert_eq!(reloaded.cart()[0].price, dec("120.00"));
        assert_eq!(reloaded.session().map(|s| s.id), Some(7));
    }

    #[test]
    fn test_cart_wire_format() {
        let mut store = store();
        store.add_item(3, "Espresso Machine", dec("350.00"), 1).unwrap();
        let raw = store.into_storage().read(CART_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["id"], 3);
        assert_eq!(json[0]["quantity"], 1);
    }

    #[test]
    fn test_corrupt_state_discarded() {
        let mut storage = MemoryStorage::new();
        storage.write(CART_KEY, "{not json").unwrap();
        let store = ClientStore::load(storage).unwrap();
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_checkout_requires_items_and_session() {
        let mut store = store();
        assert!(matches!(
            store.checkout_request(shipping()),
            Err(ClientError::EmptyCart)
        ));

        store.add_item(1, "Camera", dec("120.00"), 2).unwrap();
        let err = store.checkout_request(shipping()).unwrap_err();
        assert!(matches!(err, ClientError::NotSignedIn));
        assert_eq!(err.to_notice().redirect, Some(Redirect::Login));

        store.sign_in(login()).unwrap();
        let pending = store.checkout_request(shipping()).unwrap();
        assert_eq!(pending.authorization(), "Bearer tok");
        assert_eq!(pending.body.cart_items.len(), 1);
        assert_eq!(pending.body.cart_items[0].product_id, 1);
        assert_eq!(pending.body.cart_items[0].quantity, 2);
        assert_eq!(pending.body.cart_items[0].price, Some(120.0));
    }

    #[test]
    fn test_success_clears_cart() {
        let mut store = store();
        store.sign_in(login()).unwrap();
        store.add_item(1, "Camera", dec("120.00"), 2).unwrap();

        let notice = store
            .finish_checkout(200, r#"{"message":"Order placed successfully!","orderId":1}"#)
            .unwrap();

        assert_eq!(notice.kind, NoticeKind::Success);
        assert!(store.cart().is_empty());
        assert!(store.session().is_some());
        let reloaded = ClientStore::load(store.into_storage()).unwrap();
        assert!(reloaded.cart().is_empty());
    }

    #[test]
    fn test_auth_failure_redirects_to_login_and_keeps_cart() {
        for status in [401, 403] {
            let mut store = store();
            store.sign_in(login()).unwrap();
            store.add_item(1, "Camera", dec("120.00"), 1).unwrap();

            let notice = store.finish_checkout(status, "").unwrap();

            assert_eq!(notice.redirect, Some(Redirect::Login));
            assert!(store.session().is_none());
            assert_eq!(store.cart().len(), 1);
        }
    }

    #[test]
    fn test_server_failure_keeps_cart() {
        let mut store = store();
        store.sign_in(login()).unwrap();
        store.add_item(1, "Camera", dec("120.00"), 1).unwrap();

        let notice = store
            .finish_checkout(500, r#"{"message":"Checkout failed"}"#)
            .unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.text, "Checkout failed");
        assert_eq!(store.cart().len(), 1);

        let notice = store.finish_checkout(502, "<html>").unwrap();
        assert_eq!(notice.text, "Checkout failed.");
    }

    #[test]
    fn test_sign_out_forgets_session() {
        let mut store = store();
        store.sign_in(login()).unwrap();
        let notice = store.sign_out().unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        let reloaded = ClientStore::load(store.into_storage()).unwrap();
        assert!(reloaded.session().is_none());
    }
}
