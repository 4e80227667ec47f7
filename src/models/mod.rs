pub mod istates;
pub mod ievents;
pub mod iauth;

pub use istates::*;
pub use ievents::*;
pub use iauth::*;

use chrono::{Local, NaiveDateTime};

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
