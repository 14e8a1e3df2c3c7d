//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the ledger tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod announcement;
pub mod contribution;
pub mod investment;
pub mod setting;
pub mod user;

// Re-export specific types to avoid conflicts
pub use announcement::{
    Column as AnnouncementColumn, Entity as Announcement, Model as AnnouncementModel,
};
pub use contribution::{
    Column as ContributionColumn, Entity as Contribution, Model as ContributionModel,
};
pub use investment::{Column as InvestmentColumn, Entity as Investment, Model as InvestmentModel};
pub use setting::{Column as SettingColumn, Entity as Setting, Model as SettingModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
