//! Guest Request Model
//!
//! 访客请求 - 呼叫服务员 / 请求结账 / 提交订单，均需员工确认或处理。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 紧急程度 (呼叫服务员)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    High,
}

/// 呼叫服务员附加信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaiterCallInfo {
    /// 呼叫原因 (可选，如 "need cutlery")
    pub reason: Option<String>,
    /// 紧急程度
    #[serde(default)]
    pub urgency: Urgency,
}

/// 请求结账附加信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillRequestInfo {
    /// 期望支付方式 (可选，如 "cash", "card")
    pub payment_method: Option<String>,
    /// 备注
    pub notes: Option<String>,
}

/// 订单条目 (访客购物车中的一项)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemInput {
    /// 商品 ID (菜单目录为外部系统，此处仅透传)
    pub product_id: String,
    /// 商品名称快照
    pub name: String,
    /// 数量
    pub quantity: u32,
    /// 条目备注
    pub note: Option<String>,
}

/// 订单提交附加信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderInfo {
    /// 客户端请求 ID (幂等去重用，可选)
    pub client_request_id: Option<String>,
    /// 订单条目
    pub items: Vec<OrderItemInput>,
}

/// 请求类型及其载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuestRequestKind {
    /// 呼叫服务员
    WaiterCall(WaiterCallInfo),
    /// 请求结账
    BillRequest(BillRequestInfo),
    /// 提交订单 (需员工审批后才进入订单系统)
    Order(OrderInfo),
}

impl GuestRequestKind {
    /// 类型标识 (用于日志和事件)
    pub fn label(&self) -> &'static str {
        match self {
            GuestRequestKind::WaiterCall(_) => "waiter_call",
            GuestRequestKind::BillRequest(_) => "bill_request",
            GuestRequestKind::Order(_) => "order",
        }
    }
}

/// 处理结果
///
/// `pending -> approved | rejected`，两个终态均不可再变更。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestResolution {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for RequestResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestResolution::Pending => write!(f, "pending"),
            RequestResolution::Approved => write!(f, "approved"),
            RequestResolution::Rejected => write!(f, "rejected"),
        }
    }
}

/// 访客请求实体
///
/// 由访客动作创建，仅员工审批/拒绝可变更；处理完毕后保留用于审计。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestRequest {
    /// 请求 ID (UUID v4)
    pub id: String,
    /// 所属会话 (引用，不拥有)
    pub session_id: String,
    /// 所属餐厅 (冗余自会话，便于员工看板查询)
    pub restaurant_id: String,
    /// 桌台 (冗余自会话)
    pub table_id: String,
    /// 请求类型及载荷
    #[serde(flatten)]
    pub kind: GuestRequestKind,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 处理状态
    pub resolution: RequestResolution,
    /// 处理人 (员工 ID)
    pub resolved_by: Option<String>,
    /// 处理时间
    pub resolved_at: Option<DateTime<Utc>>,
    /// 审批备注 / 拒绝原因
    pub resolution_notes: Option<String>,
}

impl GuestRequest {
    /// 是否仍待处理
    pub fn is_pending(&self) -> bool {
        self.resolution == RequestResolution::Pending
    }
}
