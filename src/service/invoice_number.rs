use chrono::NaiveDate;
use rand::Rng;

/// 生成发票编号: INV-YYYYMMDD-NNNN (日期 + 4位随机后缀), 保存前可修改或重新生成
pub fn generate(today: NaiveDate) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("INV-{}-{:04}", today.format("%Y%m%d"), suffix)
}
