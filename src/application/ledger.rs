use crate::domain::config::LedgerConfig;
use crate::domain::payment::{
    Currency, FeeSplit, MAX_GRACE_PERIOD, MAX_INTEREST_RATE, OrderId, Payment, PaymentRequest,
    PaymentStatus, PaymentUpdate, validate_location,
};
use crate::domain::ports::{LedgerCommit, LedgerStoreBox};
use crate::domain::principal::{CallContext, Principal};
use crate::domain::transfer::TransferIntent;
use crate::error::{PaymentError, Result};
use tracing::{debug, info, warn};

/// The escrow payment ledger.
///
/// Owns the configuration and talks to storage through a [`LedgerStore`]
/// port. Every mutating operation takes `&mut self`, so calls are serialized
/// by ownership. Each operation validates first and then hands a single
/// [`LedgerCommit`] to the store; a rejected call leaves nothing behind.
///
/// [`LedgerStore`]: crate::domain::ports::LedgerStore
pub struct PaymentLedger {
    store: LedgerStoreBox,
    config: LedgerConfig,
}

impl PaymentLedger {
    /// Opens a ledger on `store`.
    ///
    /// A configuration already present in the store takes precedence over
    /// `config`, which is only written when the store is fresh.
    pub async fn open(store: LedgerStoreBox, config: LedgerConfig) -> Result<Self> {
        let config = match store.load_config().await? {
            Some(stored) => {
                info!(
                    owner = %stored.contract_owner,
                    next_payment_id = stored.next_payment_id,
                    "Resuming ledger from stored configuration"
                );
                stored
            }
            None => {
                config.validate()?;
                store
                    .commit(LedgerCommit {
                        config: Some(config.clone()),
                        ..Default::default()
                    })
                    .await?;
                config
            }
        };
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Number of payments ever created.
    pub fn payment_count(&self) -> u64 {
        self.config.next_payment_id
    }

    pub async fn payment(&self, order_id: OrderId) -> Result<Option<Payment>> {
        self.store.get_payment(order_id).await
    }

    pub async fn payment_update(&self, order_id: OrderId) -> Result<Option<PaymentUpdate>> {
        self.store.get_update(order_id).await
    }

    pub async fn payments(&self) -> Result<Vec<Payment>> {
        self.store.all_payments().await
    }

    /// The transfer-intent log in the order intents were recorded.
    pub async fn transfers(&self) -> Result<Vec<TransferIntent>> {
        self.store.transfers().await
    }

    pub async fn set_escrow_account(&mut self, ctx: &CallContext, escrow: Principal) -> Result<()> {
        self.update_config(ctx, "set_escrow_account", |config| {
            config.escrow_account = Some(escrow);
            Ok(())
        })
        .await
    }

    pub async fn set_payment_fee_rate(&mut self, ctx: &CallContext, rate: i64) -> Result<()> {
        self.update_config(ctx, "set_payment_fee_rate", |config| {
            config.set_payment_fee_rate(rate)
        })
        .await
    }

    pub async fn set_max_payments(&mut self, ctx: &CallContext, max: i64) -> Result<()> {
        self.update_config(ctx, "set_max_payments", |config| config.set_max_payments(max))
            .await
    }

    pub async fn set_creation_fee(&mut self, ctx: &CallContext, fee: i64) -> Result<()> {
        self.update_config(ctx, "set_creation_fee", |config| config.set_creation_fee(fee))
            .await
    }

    async fn update_config<F>(&mut self, ctx: &CallContext, op: &'static str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut LedgerConfig) -> Result<()>,
    {
        let result = self.try_update_config(ctx, apply).await;
        if result.is_ok() {
            debug!(op, caller = %ctx.caller, "Configuration updated");
        }
        result.inspect_err(|err| log_rejection(op, ctx, err))
    }

    async fn try_update_config<F>(&mut self, ctx: &CallContext, apply: F) -> Result<()>
    where
        F: FnOnce(&mut LedgerConfig) -> Result<()>,
    {
        if !self.config.is_owner(&ctx.caller) {
            return Err(PaymentError::NotAuthorized);
        }
        let mut next = self.config.clone();
        apply(&mut next)?;
        self.store
            .commit(LedgerCommit {
                config: Some(next.clone()),
                ..Default::default()
            })
            .await?;
        self.config = next;
        Ok(())
    }

    /// Creates a pending payment funded by the caller.
    ///
    /// Checks run in a fixed order and the first failure wins. On success
    /// two intents are recorded: the gross amount into escrow, then the fee
    /// from escrow to the contract owner.
    pub async fn process_payment(
        &mut self,
        ctx: &CallContext,
        request: PaymentRequest,
    ) -> Result<OrderId> {
        let result = self.try_process_payment(ctx, request).await;
        if let Ok(order_id) = result {
            debug!(order_id, customer = %ctx.caller, "Payment created");
        }
        result.inspect_err(|err| log_rejection("process_payment", ctx, err))
    }

    async fn try_process_payment(
        &mut self,
        ctx: &CallContext,
        request: PaymentRequest,
    ) -> Result<OrderId> {
        if !self.config.has_capacity() {
            return Err(PaymentError::MaxPaymentsExceeded);
        }
        if request.amount <= 0 {
            return Err(PaymentError::InvalidAmount);
        }
        if request.vendor == ctx.caller {
            return Err(PaymentError::InvalidVendor);
        }
        let currency: Currency = request.currency.parse()?;
        validate_location(&request.location)?;
        if request.grace_period > MAX_GRACE_PERIOD {
            return Err(PaymentError::InvalidGracePeriod(request.grace_period));
        }
        if request.interest_rate > MAX_INTEREST_RATE {
            return Err(PaymentError::InvalidInterestRate(request.interest_rate));
        }
        if self.store.get_payment(request.order_id).await?.is_some() {
            return Err(PaymentError::OrderAlreadyPaid(request.order_id));
        }
        let escrow = self.config.escrow()?.clone();

        let gross = request.amount as u64;
        let split = FeeSplit::compute(gross, self.config.payment_fee_rate);
        let transfers = vec![
            TransferIntent::new(gross, &ctx.caller, &escrow),
            TransferIntent::new(split.fee, &escrow, &self.config.contract_owner),
        ];

        let payment = Payment {
            order_id: request.order_id,
            customer: ctx.caller.clone(),
            vendor: request.vendor,
            amount: split.net,
            fee: split.fee,
            status: PaymentStatus::Pending,
            timestamp: ctx.time,
            currency,
            location: request.location,
            grace_period: request.grace_period,
            interest_rate: request.interest_rate,
        };

        let mut next = self.config.clone();
        next.next_payment_id += 1;

        self.store
            .commit(LedgerCommit {
                config: Some(next.clone()),
                payment: Some(payment),
                update: None,
                transfers,
            })
            .await?;
        self.config = next;

        Ok(request.order_id)
    }

    /// Releases the net amount of a pending payment to its vendor.
    ///
    /// Only the vendor may complete. Any rule violation yields `Ok(false)`
    /// without saying which rule; `Err` is reserved for storage failures.
    pub async fn complete_payment(&mut self, ctx: &CallContext, order_id: OrderId) -> Result<bool> {
        self.settle(ctx, order_id, PaymentStatus::Completed).await
    }

    /// Returns the net amount of a pending payment to its customer.
    ///
    /// Either party may refund. Failures are reported like
    /// [`complete_payment`](Self::complete_payment).
    pub async fn refund_payment(&mut self, ctx: &CallContext, order_id: OrderId) -> Result<bool> {
        self.settle(ctx, order_id, PaymentStatus::Refunded).await
    }

    async fn settle(
        &mut self,
        ctx: &CallContext,
        order_id: OrderId,
        status: PaymentStatus,
    ) -> Result<bool> {
        match self.try_settle(ctx, order_id, status).await {
            Ok(()) => {
                debug!(order_id, %status, updater = %ctx.caller, "Payment settled");
                Ok(true)
            }
            Err(err) if err.is_rejection() => {
                debug!(order_id, %status, caller = %ctx.caller, reason = %err, "Settlement refused");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    async fn try_settle(
        &mut self,
        ctx: &CallContext,
        order_id: OrderId,
        status: PaymentStatus,
    ) -> Result<()> {
        let mut payment = self
            .store
            .get_payment(order_id)
            .await?
            .ok_or(PaymentError::OrderNotFound(order_id))?;

        let (authorized, recipient) = match status {
            PaymentStatus::Completed => (ctx.caller == payment.vendor, payment.vendor.clone()),
            PaymentStatus::Refunded => (
                ctx.caller == payment.customer || ctx.caller == payment.vendor,
                payment.customer.clone(),
            ),
            PaymentStatus::Pending => (false, payment.customer.clone()),
        };
        if !authorized {
            return Err(PaymentError::NotAuthorized);
        }
        payment.settle(status, ctx.time)?;
        let escrow = self.config.escrow()?;

        let transfer = TransferIntent::new(payment.amount, escrow, &recipient);
        let update = PaymentUpdate {
            update_status: status,
            update_timestamp: ctx.time,
            updater: ctx.caller.clone(),
        };

        self.store
            .commit(LedgerCommit {
                config: None,
                payment: Some(payment),
                update: Some((order_id, update)),
                transfers: vec![transfer],
            })
            .await
    }
}

fn log_rejection(op: &'static str, ctx: &CallContext, err: &PaymentError) {
    match err.code() {
        Some(code) => warn!(op, code, caller = %ctx.caller, "Call rejected: {err}"),
        None => warn!(op, caller = %ctx.caller, "Call failed: {err}"),
    }
}
