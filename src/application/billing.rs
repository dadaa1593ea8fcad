use crate::config::GuestConfig;
use crate::domain::billing::{BillingDefaults, BillingProfile};
use crate::domain::partner::{Actor, Partner};
use crate::domain::ports::{PartnerDirectoryBox, SalesStoreBox};
use crate::domain::reference;
use crate::error::{PaymentError, Result};
use tracing::{debug, warn};

/// One place the bill-to data may come from, tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingSource {
    /// Customer of the invoice a payment reference was derived from.
    InvoiceReference(String),
    /// Customer of an invoice given by id.
    Invoice(u64),
    /// Customer of the sale order, only when the actor may read it.
    Order(u64),
    /// Explicit partner, read normally then with elevated access.
    Partner(u64),
    /// Shared guest partner, created on first use.
    Guest,
}

/// What was actually used to fill the bill-to block.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBilling {
    pub profile: BillingProfile,
    pub partner_id: Option<u64>,
    pub source: Option<BillingSource>,
}

/// Looks up the customer to bill, tolerating records the actor cannot read.
pub struct BillingResolver {
    partners: PartnerDirectoryBox,
    sales: SalesStoreBox,
    defaults: BillingDefaults,
    guest: GuestConfig,
}

impl BillingResolver {
    pub fn new(
        partners: PartnerDirectoryBox,
        sales: SalesStoreBox,
        defaults: BillingDefaults,
        guest: GuestConfig,
    ) -> Self {
        Self {
            partners,
            sales,
            defaults,
            guest,
        }
    }

    /// Orders the sources worth trying for a checkout.
    pub fn plan(
        reference: &str,
        invoice_id: Option<u64>,
        sale_order_id: Option<u64>,
        partner_id: Option<u64>,
    ) -> Vec<BillingSource> {
        let mut sources = Vec::new();
        if sale_order_id.is_none() {
            if let Some(name) = reference::invoice_name(reference) {
                sources.push(BillingSource::InvoiceReference(name.to_string()));
            }
            if let Some(id) = invoice_id {
                sources.push(BillingSource::Invoice(id));
            }
        }
        if let Some(id) = sale_order_id {
            sources.push(BillingSource::Order(id));
        }
        if let Some(id) = partner_id {
            sources.push(BillingSource::Partner(id));
        }
        sources.push(BillingSource::Guest);
        sources
    }

    /// Tries every source in order; the first readable partner wins.
    ///
    /// Never fails: when every source is exhausted the profile is built from
    /// the configured defaults alone.
    pub async fn resolve(&self, sources: &[BillingSource], actor: Actor) -> ResolvedBilling {
        for source in sources {
            match self.read_source(source, actor).await {
                Ok(partner) => {
                    debug!(?source, partner_id = partner.id, "billing partner resolved");
                    return ResolvedBilling {
                        profile: BillingProfile::from_partner(&partner, &self.defaults),
                        partner_id: Some(partner.id),
                        source: Some(source.clone()),
                    };
                }
                Err(e) => warn!(?source, error = %e, "billing source unavailable, trying next"),
            }
        }
        warn!("no billing partner could be resolved, using placeholder profile");
        ResolvedBilling {
            profile: BillingProfile::placeholder(&self.defaults),
            partner_id: None,
            source: None,
        }
    }

    async fn read_source(&self, source: &BillingSource, actor: Actor) -> Result<Partner> {
        match source {
            BillingSource::InvoiceReference(name) => {
                let invoice = self.sales.invoice_by_name(name).await?.ok_or_else(|| {
                    PaymentError::ValidationError(format!("invoice {name} not found"))
                })?;
                self.read_with_elevation(invoice.partner_id, actor).await
            }
            BillingSource::Invoice(id) => {
                let invoice = self
                    .sales
                    .invoice(*id)
                    .await?
                    .ok_or(PaymentError::RecordNotFound {
                        entity: "invoice",
                        id: *id,
                    })?;
                self.read_with_elevation(invoice.partner_id, actor).await
            }
            BillingSource::Order(id) => {
                let order = self
                    .sales
                    .order(*id)
                    .await?
                    .ok_or(PaymentError::RecordNotFound {
                        entity: "sale order",
                        id: *id,
                    })?;
                self.partners.try_read(order.partner_id, actor).await
            }
            BillingSource::Partner(id) => self.read_with_elevation(*id, actor).await,
            BillingSource::Guest => self.guest_partner().await,
        }
    }

    async fn read_with_elevation(&self, id: u64, actor: Actor) -> Result<Partner> {
        match self.partners.try_read(id, actor).await {
            Ok(partner) => Ok(partner),
            Err(e) => {
                debug!(partner_id = id, error = %e, "normal read failed, using elevated access");
                self.partners.read_privileged(id).await
            }
        }
    }

    /// Returns the shared guest partner, creating it only if it does not exist yet.
    pub async fn guest_partner(&self) -> Result<Partner> {
        if let Some(existing) = self
            .partners
            .find_by_name_and_email(&self.guest.name, &self.guest.email)
            .await?
        {
            return Ok(existing);
        }
        let mut guest = Partner::new(0, self.guest.name.clone());
        guest.email = Some(self.guest.email.clone());
        guest.street = Some(self.defaults.address.clone());
        guest.city = Some(self.defaults.city.clone());
        guest.state_code = Some(self.defaults.region.clone());
        guest.zip = Some(self.defaults.postal_code.clone());
        guest.country_code = Some(self.defaults.country.clone());
        guest.phone = Some(self.defaults.phone.clone());
        let created = self.partners.create(guest).await?;
        debug!(partner_id = created.id, "guest partner created");
        Ok(created)
    }
}
