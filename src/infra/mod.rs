//! インフラストラクチャ層
//!
//! 外部との入出力（HTTP通信、時刻取得）と、ワイヤ形式の解析を担当します。

pub mod api;
pub mod clock;
pub mod parser;
