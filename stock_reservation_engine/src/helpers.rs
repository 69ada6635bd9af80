use rand::Rng;

use crate::db_types::OrderId;

/// Mint a new public order id. 128 random bits keeps collisions out of the picture
/// without coordinating with the database.
pub fn new_order_id() -> OrderId {
    let n: u128 = rand::thread_rng().gen();
    OrderId(format!("ord-{n:032x}"))
}
