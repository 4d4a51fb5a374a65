//! Address service: a customer's delivery address book.
//!
//! Maintains the default-flag invariant: at most one default per customer,
//! and whenever a customer has addresses at all, creating the first one or
//! calling `set_default` establishes exactly one.

use std::sync::Arc;

use mekong_core::{AddressId, CustomerId};

use crate::error::{MarketplaceError, Result};
use crate::models::{Address, NewAddress};
use crate::stores::AddressStore;

/// Caller-supplied address fields.
#[derive(Debug, Clone)]
pub struct AddressRequest {
    /// Name of the person receiving the delivery.
    pub recipient_name: String,
    /// Contact phone for the delivery.
    pub recipient_phone: String,
    /// Street-level address line.
    pub line: String,
    /// Ward.
    pub ward: String,
    /// District.
    pub district: String,
    /// City or province.
    pub city: String,
    /// Optional label ("Home", "Office").
    pub label: Option<String>,
    /// Whether this address should become the default.
    pub is_default: bool,
}

/// Address book operations for customers.
#[derive(Clone)]
pub struct AddressService {
    addresses: Arc<dyn AddressStore>,
}

impl AddressService {
    /// Create an address service over its collaborator.
    #[must_use]
    pub fn new(addresses: Arc<dyn AddressStore>) -> Self {
        Self { addresses }
    }

    /// List the customer's addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `Store` on collaborator failure.
    pub async fn list(&self, customer_id: CustomerId) -> Result<Vec<Address>> {
        Ok(self.addresses.list_by_customer(customer_id).await?)
    }

    /// Create an address.
    ///
    /// The customer's first address always becomes the default, as does any
    /// address created with the default flag set; previous defaults are
    /// unset in the same operation.
    ///
    /// # Errors
    ///
    /// Returns `Store` on collaborator failure.
    pub async fn create(
        &self,
        customer_id: CustomerId,
        request: AddressRequest,
    ) -> Result<Address> {
        let existing = self.addresses.list_by_customer(customer_id).await?;
        let should_be_default = existing.is_empty() || request.is_default;

        if should_be_default {
            self.unset_defaults(existing).await?;
        }

        let address = self
            .addresses
            .create_address(NewAddress {
                customer_id,
                recipient_name: request.recipient_name,
                recipient_phone: request.recipient_phone,
                line: request.line,
                ward: request.ward,
                district: request.district,
                city: request.city,
                label: request.label,
                is_default: should_be_default,
            })
            .await?;

        tracing::info!(address_id = %address.id, %customer_id, "created address");
        Ok(address)
    }

    /// Update an address's fields.
    ///
    /// Setting the default flag on a non-default address unsets the
    /// previous default.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown address and `Permission` if it
    /// belongs to another customer.
    pub async fn update(
        &self,
        customer_id: CustomerId,
        address_id: AddressId,
        request: AddressRequest,
    ) -> Result<Address> {
        let address = self.owned(customer_id, address_id).await?;

        if request.is_default && !address.is_default {
            let existing = self.addresses.list_by_customer(customer_id).await?;
            self.unset_defaults(existing).await?;
        }

        let updated = self
            .addresses
            .update_address(Address {
                id: address.id,
                customer_id: address.customer_id,
                recipient_name: request.recipient_name,
                recipient_phone: request.recipient_phone,
                line: request.line,
                ward: request.ward,
                district: request.district,
                city: request.city,
                label: request.label,
                is_default: request.is_default,
                created_at: address.created_at,
            })
            .await?;

        tracing::info!(address_id = %address_id, "updated address");
        Ok(updated)
    }

    /// Delete an address.
    ///
    /// The default address cannot be deleted while other addresses exist;
    /// deleting the sole remaining (default) address is allowed.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when deleting a default with siblings present.
    pub async fn delete(&self, customer_id: CustomerId, address_id: AddressId) -> Result<()> {
        let address = self.owned(customer_id, address_id).await?;

        if address.is_default {
            let count = self.addresses.list_by_customer(customer_id).await?.len();
            if count > 1 {
                return Err(MarketplaceError::Validation(
                    "cannot delete default address; set another address as default first"
                        .to_string(),
                ));
            }
        }

        self.addresses.delete_address(address_id).await?;
        tracing::info!(address_id = %address_id, "deleted address");
        Ok(())
    }

    /// Make an address the customer's default.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown address and `Permission` if it
    /// belongs to another customer.
    pub async fn set_default(
        &self,
        customer_id: CustomerId,
        address_id: AddressId,
    ) -> Result<Address> {
        let mut address = self.owned(customer_id, address_id).await?;

        let existing = self.addresses.list_by_customer(customer_id).await?;
        self.unset_defaults(existing).await?;

        address.is_default = true;
        let updated = self.addresses.update_address(address).await?;

        tracing::info!(address_id = %address_id, "set default address");
        Ok(updated)
    }

    async fn owned(&self, customer_id: CustomerId, address_id: AddressId) -> Result<Address> {
        let address = self
            .addresses
            .get_address(address_id)
            .await?
            .ok_or(MarketplaceError::NotFound("address"))?;
        if address.customer_id != customer_id {
            return Err(MarketplaceError::Permission(
                "address does not belong to current customer",
            ));
        }
        Ok(address)
    }

    async fn unset_defaults(&self, addresses: Vec<Address>) -> Result<()> {
        for mut address in addresses.into_iter().filter(|a| a.is_default) {
            address.is_default = false;
            self.addresses.update_address(address).await?;
        }
        Ok(())
    }
}
