pub mod commerce_client;
pub mod razorpay_client;

pub use commerce_client::{CommerceApi, CommerceClient};
pub use razorpay_client::RazorpayClient;
