mod helpers;
mod login;
mod permissions;
mod users;
