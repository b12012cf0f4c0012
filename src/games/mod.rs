pub mod briscola;
