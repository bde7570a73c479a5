pub mod buy_flow;
pub mod rent_flow;
