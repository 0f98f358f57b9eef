//! Route handlers, grouped by the gateway they front.

pub mod controlpay;
pub mod events;
pub mod health;
pub mod payer;
