//! Database entities module

pub mod booking;
pub mod conversation;
pub mod message;
pub mod review;
pub mod sales_transaction;
pub mod user;
pub mod vehicle;

pub use booking::Entity as Booking;
pub use conversation::Entity as Conversation;
pub use message::Entity as Message;
pub use review::Entity as Review;
pub use sales_transaction::Entity as SalesTransaction;
pub use user::Entity as User;
pub use vehicle::Entity as Vehicle;
