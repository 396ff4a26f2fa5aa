// Microsoft Graph `/users` surface: client, paging, and wire types.

mod client;
mod paging;
pub mod types;

pub use client::{GraphClient, UsersQuery};
pub use paging::Paged;
pub use types::{DepartmentRecord, GraphUser, Page};
