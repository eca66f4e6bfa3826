use bigdecimal::{BigDecimal, Zero};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::InvoiceConfig;
use crate::models::Stored;

/// 发票明细行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub quantity: BigDecimal,
    pub unit_price: BigDecimal,
}

impl LineItem {
    /// 新增空白明细: 数量 1, 单价 0
    pub fn blank() -> Self {
        Self {
            id: format!("item_{}", Uuid::new_v4().simple()),
            name: String::new(),
            quantity: BigDecimal::from(1),
            unit_price: BigDecimal::zero(),
        }
    }

    pub fn line_total(&self) -> BigDecimal {
        &self.quantity * &self.unit_price
    }
}

/// 客户信息快照 (复制到发票, 不引用客户档案)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub address: String,
    pub email: String,
}

/// 发票存储形式 (invoices 集合)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub invoice_number: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub client_name: String,
    pub client_address: String,
    pub client_email: String,
    pub items: Vec<LineItem>,
    pub tax_rate: BigDecimal,
    pub discount: BigDecimal,
    pub received_amount: BigDecimal,
    pub notes: String,
}

/// 发票编辑形式 (表单草稿)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub client: ClientInfo,
    pub items: Vec<LineItem>,
    pub tax_rate: BigDecimal,
    pub discount: BigDecimal,
    pub received_amount: BigDecimal,
    pub notes: String,
}

impl InvoiceDraft {
    /// 新建草稿: 开票日为今天, 到期日按配置顺延
    pub fn new(invoice_number: String, today: NaiveDate, defaults: &InvoiceConfig) -> Self {
        Self {
            id: None,
            invoice_number,
            date: today,
            due_date: today + Duration::days(defaults.due_in_days),
            client: ClientInfo::default(),
            items: Vec::new(),
            tax_rate: defaults.default_tax_rate.clone(),
            discount: BigDecimal::zero(),
            received_amount: BigDecimal::zero(),
            notes: String::new(),
        }
    }

    pub fn add_item(&mut self) -> &LineItem {
        self.items.push(LineItem::blank());
        &self.items[self.items.len() - 1]
    }

    /// 按 id 替换明细, 返回是否找到
    pub fn update_item(&mut self, item: LineItem) -> bool {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    /// 编辑形式 -> 存储形式 (去掉服务端字段)
    pub fn to_record(&self) -> InvoiceRecord {
        InvoiceRecord {
            invoice_number: self.invoice_number.clone(),
            date: self.date,
            due_date: self.due_date,
            client_name: self.client.name.clone(),
            client_address: self.client.address.clone(),
            client_email: self.client.email.clone(),
            items: self.items.clone(),
            tax_rate: self.tax_rate.clone(),
            discount: self.discount.clone(),
            received_amount: self.received_amount.clone(),
            notes: self.notes.clone(),
        }
    }

    /// 存储形式 -> 编辑形式
    pub fn from_stored(stored: &Stored<InvoiceRecord>) -> Self {
        let record = &stored.data;
        Self {
            id: Some(stored.id),
            invoice_number: record.invoice_number.clone(),
            date: record.date,
            due_date: record.due_date,
            client: ClientInfo {
                name: record.client_name.clone(),
                address: record.client_address.clone(),
                email: record.client_email.clone(),
            },
            items: record.items.clone(),
            tax_rate: record.tax_rate.clone(),
            discount: record.discount.clone(),
            received_amount: record.received_amount.clone(),
            notes: record.notes.clone(),
        }
    }
}
