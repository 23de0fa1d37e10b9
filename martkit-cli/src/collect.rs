//! Interactive payment collection for the terminal.
//!
//! Headless stand-in for the gateway's mobile SDK: prints the gateway
//! order, then reads the signed callback values the gateway dashboard (or
//! a sandbox webhook) reports for the charge.  An empty payment id means
//! the shopper backed out.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use martkit_core::checkout::{
    CollectError, ContactPrefill, GatewayOrder, PaymentCollector, PaymentReceipt,
};

pub struct PromptCollector {
    pub merchant_name: String,
    pub key_id: Option<String>,
}

impl PromptCollector {
    async fn prompt(&self, label: &str) -> Result<String, CollectError> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{label}: ").as_bytes())
            .await
            .map_err(|e| CollectError::Failed(format!("terminal error: {e}").into()))?;
        stdout
            .flush()
            .await
            .map_err(|e| CollectError::Failed(format!("terminal error: {e}").into()))?;

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        reader
            .read_line(&mut line)
            .await
            .map_err(|e| CollectError::Failed(format!("terminal error: {e}").into()))?;
        Ok(line.trim().to_owned())
    }
}

#[async_trait]
impl PaymentCollector for PromptCollector {
    async fn collect(
        &self,
        order: &GatewayOrder,
        prefill: &ContactPrefill,
    ) -> Result<PaymentReceipt, CollectError> {
        let amount = Decimal::from(order.amount_minor) / Decimal::from(100);
        println!();
        println!("=== {} payment ===", self.merchant_name);
        if let Some(key_id) = &self.key_id {
            println!("gateway key:   {key_id}");
        }
        println!("gateway order: {}", order.gateway_order_id);
        println!("amount:        {amount}");
        println!("contact:       {} / {} / {}", prefill.name, prefill.phone, prefill.email);
        println!("Complete the charge in the gateway sandbox, then paste the callback values.");
        println!("(leave payment id empty to cancel)");

        let payment_id = self.prompt("payment id").await?;
        if payment_id.is_empty() {
            return Err(CollectError::Cancelled);
        }
        let signature = self.prompt("signature").await?;
        if signature.is_empty() {
            return Err(CollectError::Failed("gateway returned no signature".into()));
        }

        Ok(PaymentReceipt {
            gateway_order_id: order.gateway_order_id.clone(),
            gateway_payment_id: payment_id.into(),
            gateway_signature: signature.into(),
        })
    }
}
