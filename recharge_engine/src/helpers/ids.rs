//! Entity id generation.
//!
//! Ids are short random strings with a table-specific prefix, so that a bare id in a log line or
//! a support ticket is self-describing.
use rand::{distributions::Alphanumeric, Rng};

const ID_LEN: usize = 20;

fn random_id(prefix: &str) -> String {
    let suffix: String =
        rand::thread_rng().sample_iter(&Alphanumeric).take(ID_LEN).map(char::from).collect();
    format!("{prefix}_{suffix}")
}

pub fn new_merchant_id() -> String {
    random_id("merchant")
}

pub fn new_game_id() -> String {
    random_id("game")
}

pub fn new_sku_id() -> String {
    random_id("sku")
}

pub fn new_order_id() -> String {
    random_id("ord")
}

pub fn new_user_id() -> String {
    random_id("user")
}

pub fn new_application_id() -> String {
    random_id("app")
}
