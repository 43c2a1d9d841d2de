use chrono::{DateTime, Utc};

use procura_auth::UserProfile;
use procura_catalog::{Category, Product, Shop, StockRecord};
use procura_core::{
    CategoryId, ContactId, DomainError, DomainResult, OrderId, ProductId, ShopId, StockRecordId,
    UserId,
};
use procura_orders::{Contact, Order};

use super::table::Table;

/// Every table of the marketplace.
///
/// Mutated only inside [`super::MarketStore::transaction`]. Shops and
/// products carry secondary indexes; add them through [`Tables::insert_shop`]
/// and [`Tables::insert_product`] so the indexes stay in step.
#[derive(Debug, Default)]
pub struct Tables {
    pub shops: Table<ShopId, Shop>,
    /// Unique index: shop name.
    pub shop_names: Table<String, ShopId>,
    /// Unique index: at most one shop per supplier.
    pub shop_owners: Table<UserId, ShopId>,
    pub categories: Table<CategoryId, Category>,
    pub products: Table<ProductId, Product>,
    /// Unique index: product name within a category.
    pub product_keys: Table<(CategoryId, String), ProductId>,
    /// Known parameter names.
    pub parameters: Table<String, ()>,
    pub stock: Table<StockRecordId, StockRecord>,
    pub orders: Table<OrderId, Order>,
    /// Unique index: at most one basket per user.
    pub baskets: Table<UserId, OrderId>,
    pub contacts: Table<ContactId, Contact>,
    pub profiles: Table<UserId, UserProfile>,
    /// Unique index: lower-cased profile email.
    pub profile_emails: Table<String, UserId>,
}

impl Tables {
    pub(super) fn commit(&mut self) {
        self.shops.commit();
        self.shop_names.commit();
        self.shop_owners.commit();
        self.categories.commit();
        self.products.commit();
        self.product_keys.commit();
        self.parameters.commit();
        self.stock.commit();
        self.orders.commit();
        self.baskets.commit();
        self.contacts.commit();
        self.profiles.commit();
        self.profile_emails.commit();
    }

    pub(super) fn rollback(&mut self) {
        self.shops.rollback();
        self.shop_names.rollback();
        self.shop_owners.rollback();
        self.categories.rollback();
        self.products.rollback();
        self.product_keys.rollback();
        self.parameters.rollback();
        self.stock.rollback();
        self.orders.rollback();
        self.baskets.rollback();
        self.contacts.rollback();
        self.profiles.rollback();
        self.profile_emails.rollback();
    }

    /// Rows changed by the running transaction, across all tables.
    pub fn touched(&self) -> usize {
        self.shops.touched()
            + self.shop_names.touched()
            + self.shop_owners.touched()
            + self.categories.touched()
            + self.products.touched()
            + self.product_keys.touched()
            + self.parameters.touched()
            + self.stock.touched()
            + self.orders.touched()
            + self.baskets.touched()
            + self.contacts.touched()
            + self.profiles.touched()
            + self.profile_emails.touched()
    }

    pub fn stock_record(&self, id: StockRecordId) -> DomainResult<&StockRecord> {
        self.stock
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("stock record {id}")))
    }

    pub fn stock_record_mut(&mut self, id: StockRecordId) -> DomainResult<&mut StockRecord> {
        self.stock
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("stock record {id}")))
    }

    pub fn product(&self, id: ProductId) -> DomainResult<&Product> {
        self.products
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))
    }

    pub fn product_by_key(&self, category: CategoryId, name: &str) -> Option<ProductId> {
        self.product_keys.get(&(category, name.to_string())).copied()
    }

    pub fn insert_product(&mut self, product: Product) -> ProductId {
        let id = product.id;
        self.product_keys
            .insert((product.category, product.name.clone()), id);
        self.products.insert(id, product);
        id
    }

    pub fn shop(&self, id: ShopId) -> DomainResult<&Shop> {
        self.shops
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("shop {id}")))
    }

    pub fn shop_mut(&mut self, id: ShopId) -> DomainResult<&mut Shop> {
        self.shops
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("shop {id}")))
    }

    pub fn shop_by_name(&self, name: &str) -> Option<&Shop> {
        self.shop_names.get(name).and_then(|id| self.shops.get(id))
    }

    pub fn shop_of_owner(&self, owner: UserId) -> Option<&Shop> {
        self.shop_owners.get(&owner).and_then(|id| self.shops.get(id))
    }

    pub fn insert_shop(&mut self, shop: Shop) -> ShopId {
        let id = shop.id;
        self.shop_names.insert(shop.name.clone(), id);
        self.shop_owners.insert(shop.owner, id);
        self.shops.insert(id, shop);
        id
    }

    pub fn order(&self, id: OrderId) -> DomainResult<&Order> {
        self.orders
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("order {id}")))
    }

    pub fn order_mut(&mut self, id: OrderId) -> DomainResult<&mut Order> {
        self.orders
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("order {id}")))
    }

    /// A user's contact; other users' contacts are reported as missing.
    pub fn contact_of(&self, user: UserId, id: ContactId) -> DomainResult<&Contact> {
        self.contacts
            .get(&id)
            .filter(|c| c.user == user)
            .ok_or_else(|| DomainError::not_found(format!("contact {id}")))
    }

    pub fn basket_of(&self, user: UserId) -> Option<&Order> {
        self.baskets.get(&user).and_then(|id| self.orders.get(id))
    }

    pub fn basket_mut(&mut self, user: UserId) -> DomainResult<&mut Order> {
        let id = *self
            .baskets
            .get(&user)
            .ok_or_else(|| DomainError::not_found(format!("basket of user {user}")))?;
        self.order_mut(id)
    }

    /// Return the user's basket, creating it if needed.
    ///
    /// The `baskets` index is checked and updated under the same write lock,
    /// so concurrent callers for one user always end up with the same order.
    pub fn basket_or_create(&mut self, user: UserId, now: DateTime<Utc>) -> &mut Order {
        let id = match self.baskets.get(&user) {
            Some(id) if self.orders.contains_key(id) => *id,
            _ => {
                let basket = Order::basket(user, now);
                let id = basket.id;
                self.orders.insert(id, basket);
                self.baskets.insert(user, id);
                id
            }
        };
        self.orders
            .get_or_insert_with(id, || Order::basket(user, now))
    }

    pub fn register_parameters<'a>(&mut self, names: impl IntoIterator<Item = &'a String>) {
        for name in names {
            if !self.parameters.contains_key(name) {
                self.parameters.insert(name.clone(), ());
            }
        }
    }

    pub fn category_exists(&self, id: CategoryId) -> bool {
        self.categories.contains_key(&id)
    }

    pub fn email_of(&self, user: UserId) -> Option<&str> {
        self.profiles.get(&user).map(|p| p.email.as_str())
    }

    /// Owner of `email`, compared case-insensitively.
    pub fn profile_by_email(&self, email: &str) -> Option<UserId> {
        self.profile_emails.get(email.to_ascii_lowercase().as_str()).copied()
    }

    /// Insert or replace a profile, keeping the email index in step.
    /// Returns `true` when the user had no profile before.
    pub fn put_profile(&mut self, profile: UserProfile) -> bool {
        let user = profile.user_id;
        let email = profile.email.to_ascii_lowercase();
        let previous = self.profiles.get(&user).map(|p| p.email.to_ascii_lowercase());
        if let Some(previous) = previous.filter(|p| *p != email) {
            self.profile_emails.remove(&previous);
        }
        self.profile_emails.insert(email, user);
        self.profiles.insert(user, profile).is_none()
    }
}
