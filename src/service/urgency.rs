use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::Serialize;

use crate::models::{OrderItem, OrderStatus, Stored};

/// 默认提醒窗口: 到期前 3 天内
pub const NOTIFICATION_WINDOW_DAYS: i64 = 3;

/// 到期紧急程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum Urgency {
    /// 已逾期 `days` 天
    Overdue { days: i64 },
    DueToday,
    /// 1~2 天内到期
    DueSoon { days: i64 },
    Normal { days: i64 },
}

impl Urgency {
    pub fn message(&self) -> String {
        match *self {
            Urgency::Overdue { days: 1 } => "1 day overdue".to_string(),
            Urgency::Overdue { days } => format!("{} days overdue", days),
            Urgency::DueToday => "Due today".to_string(),
            Urgency::DueSoon { days: 1 } | Urgency::Normal { days: 1 } => "Due tomorrow".to_string(),
            Urgency::DueSoon { days } | Urgency::Normal { days } => format!("Due in {} days", days),
        }
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self, Urgency::Overdue { .. })
    }
}

pub fn days_until(due_date: NaiveDate, today: NaiveDate) -> i64 {
    (due_date - today).num_days()
}

/// 终态订单不参与分类
pub fn classify(due_date: NaiveDate, today: NaiveDate, status: OrderStatus) -> Option<Urgency> {
    if status.is_terminal() {
        return None;
    }

    let days = days_until(due_date, today);
    let urgency = match days {
        d if d < 0 => Urgency::Overdue { days: -d },
        0 => Urgency::DueToday,
        1..=2 => Urgency::DueSoon { days },
        _ => Urgency::Normal { days },
    };
    Some(urgency)
}

pub fn is_overdue(order: &OrderItem, today: NaiveDate) -> bool {
    classify(order.due_date, today, order.status).is_some_and(|u| u.is_overdue())
}

/// 提醒栏条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub order_id: i64,
    pub client_name: String,
    pub item_description: String,
    pub due_date: NaiveDate,
    pub urgency: Urgency,
    pub message: String,
}

/// 需要提醒的订单: 未完成、未被忽略、已逾期或在提醒窗口内; 保持输入顺序
pub fn urgent_orders(
    orders: &[Stored<OrderItem>],
    today: NaiveDate,
    window_days: i64,
    dismissed: &IndexSet<i64>,
) -> Vec<Notification> {
    orders
        .iter()
        .filter(|order| !dismissed.contains(&order.id))
        .filter(|order| days_until(order.data.due_date, today) <= window_days)
        .filter_map(|order| {
            let urgency = classify(order.data.due_date, today, order.data.status)?;
            Some(Notification {
                order_id: order.id,
                client_name: order.data.client_name.clone(),
                item_description: order.data.item_description.clone(),
                due_date: order.data.due_date,
                urgency,
                message: urgency.message(),
            })
        })
        .collect()
}

pub fn banner_heading(count: usize) -> String {
    if count == 1 {
        "1 Order Needs Attention".to_string()
    } else {
        format!("{} Orders Need Attention", count)
    }
}
