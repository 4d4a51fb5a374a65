//! Cart service: building and maintaining a customer's cart.
//!
//! A cart is created lazily on first access and mutated freely until
//! checkout drains it. Every line mutation verifies that the line belongs
//! to the calling customer.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use mekong_core::{
    CartId, CartLineId, CustomerId, ProductId, SelectedOption, VendorId, encode_options,
};

use crate::error::{MarketplaceError, Result};
use crate::models::{CartLine, NewCartLine, Product, Vendor};
use crate::pricing;
use crate::stores::{CartStore, CatalogStore};

/// A priced view of a cart, grouped by vendor for display.
#[derive(Debug, Clone)]
pub struct CartView {
    /// Cart ID.
    pub cart_id: CartId,
    /// All lines in add order.
    pub lines: Vec<CartLineView>,
    /// The same lines grouped by vendor, in vendor-first-seen order.
    pub vendor_groups: Vec<VendorGroupView>,
    /// Sum of all line subtotals.
    pub total_amount: Decimal,
}

/// One priced cart line.
#[derive(Debug, Clone)]
pub struct CartLineView {
    /// Line ID.
    pub line_id: CartLineId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Current product name.
    pub product_name: String,
    /// Vendor who owns the product.
    pub vendor_id: VendorId,
    /// Vendor store name.
    pub vendor_name: String,
    /// Number of units.
    pub quantity: u32,
    /// Options chosen at add time.
    pub selected_options: Vec<SelectedOption>,
    /// Current unit price (live base price plus frozen adjustments).
    pub unit_price: Decimal,
    /// `unit_price * quantity`.
    pub subtotal: Decimal,
}

/// Cart lines belonging to one vendor.
#[derive(Debug, Clone)]
pub struct VendorGroupView {
    /// Vendor ID.
    pub vendor_id: VendorId,
    /// Vendor store name.
    pub vendor_name: String,
    /// This vendor's lines, in add order.
    pub lines: Vec<CartLineView>,
}

/// Cart operations for customers.
#[derive(Clone)]
pub struct CartService {
    catalog: Arc<dyn CatalogStore>,
    carts: Arc<dyn CartStore>,
}

impl CartService {
    /// Create a cart service over its collaborators.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogStore>, carts: Arc<dyn CartStore>) -> Self {
        Self { catalog, carts }
    }

    /// Fetch the customer's cart as a priced, vendor-grouped view.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if a referenced product or vendor has vanished
    /// from the catalog, or `Store` on collaborator failure.
    pub async fn get_cart(&self, customer_id: CustomerId) -> Result<CartView> {
        let cart = self.carts.get_or_create(customer_id).await?;

        let mut lines = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            lines.push(self.build_line_view(line).await?);
        }

        let total_amount = lines.iter().map(|line| line.subtotal).sum();
        let vendor_groups = group_by_vendor(&lines);

        Ok(CartView {
            cart_id: cart.id,
            lines,
            vendor_groups,
            total_amount,
        })
    }

    /// Add a product to the customer's cart.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a zero quantity or an unavailable product,
    /// `NotFound` for an unknown product.
    pub async fn add_line(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: u32,
        selected_options: &[SelectedOption],
    ) -> Result<CartLineView> {
        validate_quantity(quantity)?;

        let product = self
            .catalog
            .get_product(product_id)
            .await?
            .ok_or(MarketplaceError::NotFound("product"))?;
        if !product.available {
            return Err(MarketplaceError::Validation(
                "product is not available".to_string(),
            ));
        }

        let selected_options_json = encode_options(selected_options)
            .map_err(|e| MarketplaceError::Validation(e.to_string()))?;

        let cart = self.carts.get_or_create(customer_id).await?;
        let line = self
            .carts
            .add_line(
                cart.id,
                NewCartLine {
                    product_id,
                    quantity,
                    selected_options_json,
                },
            )
            .await?;

        tracing::info!(
            %customer_id,
            product_name = %product.name,
            quantity,
            "added product to cart"
        );

        self.build_line_view(&line).await
    }

    /// Change a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `Permission` if the line belongs to another customer's cart.
    pub async fn update_line_quantity(
        &self,
        customer_id: CustomerId,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<CartLineView> {
        validate_quantity(quantity)?;
        self.owned_line(customer_id, line_id).await?;

        let line = self.carts.update_line_quantity(line_id, quantity).await?;
        tracing::info!(%customer_id, %line_id, quantity, "updated cart line quantity");
        self.build_line_view(&line).await
    }

    /// Remove a single line from the customer's cart.
    ///
    /// # Errors
    ///
    /// Returns `Permission` if the line belongs to another customer's cart.
    pub async fn remove_line(&self, customer_id: CustomerId, line_id: CartLineId) -> Result<()> {
        self.owned_line(customer_id, line_id).await?;
        self.carts.remove_line(line_id).await?;
        tracing::info!(%customer_id, %line_id, "removed cart line");
        Ok(())
    }

    /// Drain every line from the customer's cart.
    ///
    /// # Errors
    ///
    /// Returns `Store` on collaborator failure.
    pub async fn clear(&self, customer_id: CustomerId) -> Result<()> {
        let cart = self.carts.get_or_create(customer_id).await?;
        self.carts.clear(cart.id).await?;
        tracing::info!(%customer_id, "cleared cart");
        Ok(())
    }

    async fn owned_line(&self, customer_id: CustomerId, line_id: CartLineId) -> Result<CartLine> {
        let (cart, line) = self
            .carts
            .get_line(line_id)
            .await?
            .ok_or(MarketplaceError::NotFound("cart line"))?;
        if cart.customer_id != customer_id {
            return Err(MarketplaceError::Permission(
                "cart line does not belong to current customer",
            ));
        }
        Ok(line)
    }

    async fn build_line_view(&self, line: &CartLine) -> Result<CartLineView> {
        let product = self
            .catalog
            .get_product(line.product_id)
            .await?
            .ok_or(MarketplaceError::NotFound("product"))?;
        let vendor = self
            .catalog
            .get_vendor(product.vendor_id)
            .await?
            .ok_or(MarketplaceError::NotFound("vendor"))?;
        Ok(build_line_view(line, &product, &vendor))
    }
}

fn validate_quantity(quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(MarketplaceError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn build_line_view(line: &CartLine, product: &Product, vendor: &Vendor) -> CartLineView {
    let selected_options = line.selected_options();
    let unit_price = pricing::line_unit_price(product.base_price, &selected_options);
    let subtotal = pricing::line_subtotal(unit_price, line.quantity);
    CartLineView {
        line_id: line.id,
        product_id: product.id,
        product_name: product.name.clone(),
        vendor_id: vendor.id,
        vendor_name: vendor.store_name.clone(),
        quantity: line.quantity,
        selected_options,
        unit_price,
        subtotal,
    }
}

/// Group line views by vendor, preserving vendor-first-seen order.
fn group_by_vendor(lines: &[CartLineView]) -> Vec<VendorGroupView> {
    let mut groups: Vec<VendorGroupView> = Vec::new();
    let mut index_by_vendor: HashMap<VendorId, usize> = HashMap::new();
    for line in lines {
        if let Some(&i) = index_by_vendor.get(&line.vendor_id) {
            if let Some(group) = groups.get_mut(i) {
                group.lines.push(line.clone());
            }
        } else {
            index_by_vendor.insert(line.vendor_id, groups.len());
            groups.push(VendorGroupView {
                vendor_id: line.vendor_id,
                vendor_name: line.vendor_name.clone(),
                lines: vec![line.clone()],
            });
        }
    }
    groups
}
