mod assessment;
mod employee;
mod notification;
mod profile;
mod training_module;
mod training_session;

#[allow(unused)]
pub use assessment::*;
#[allow(unused)]
pub use employee::*;
#[allow(unused)]
pub use notification::*;
#[allow(unused)]
pub use profile::*;
#[allow(unused)]
pub use training_module::*;
#[allow(unused)]
pub use training_session::*;
