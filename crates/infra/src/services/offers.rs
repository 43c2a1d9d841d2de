use procura_catalog::{Offer, OfferFilter};
use procura_core::DomainResult;

use super::Marketplace;

impl Marketplace {
    /// Purchasable listings: active shops, quantity above zero.
    pub fn list_offers(&self, filter: OfferFilter) -> DomainResult<Vec<Offer>> {
        self.store.read(|t| {
            let mut offers = Vec::new();
            for record in t.stock.values() {
                if record.quantity() == 0 {
                    continue;
                }
                let shop = t.shop(record.shop)?;
                if !shop.is_active {
                    continue;
                }
                let product = t.product(record.product)?;
                if !filter.matches(product, record) {
                    continue;
                }
                let category_name = t
                    .categories
                    .get(&product.category)
                    .map(|c| c.name.clone())
                    .unwrap_or_default();

                offers.push(Offer {
                    record: record.clone(),
                    product: product.clone(),
                    category_name,
                    shop: shop.clone(),
                });
            }
            offers.sort_by(|a, b| {
                a.product
                    .name
                    .cmp(&b.product.name)
                    .then(a.shop.name.cmp(&b.shop.name))
            });
            Ok(offers)
        })
    }
}
