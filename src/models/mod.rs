pub mod cart;
pub mod chat_history;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem};
pub use chat_history::{ChatHistory, ChatMessage};
pub use order::{Order, OrderItem, OrderStatus, PaymentInfo, PaymentMethod, PaymentStatus, ShippingAddress};
pub use product::{Category, Gender, Product};
pub use user::{User, UserAddress};
