pub mod api;
pub mod cart;
pub mod chat;
pub mod order;
pub mod pay;

pub use api::ApiResponse;
pub use cart::{CartAddRequest, CartItemView, CartRemoveRequest, CartUpdateRequest, CartView};
pub use chat::{ChatRequest, ChatResponse, ProductSummary};
pub use order::{OrdersPage, OrdersQuery, Pagination, UpdateOrderRequest};
pub use pay::{CheckoutData, CheckoutRequest, VerifyPaymentData, VerifyPaymentRequest, WebhookQuery};
