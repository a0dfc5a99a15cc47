use super::string_or_false;
use serde::{Deserialize, Serialize};

/// Result of `get_lot_history`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotHistory {
    pub general_info: GeneralInfo,
    pub statistics: HistoryStatistics,
    pub purchase_info: Vec<PurchaseLine>,
    pub has_purchase_permissions: bool,
    pub movements: Vec<Movement>,
    pub sales_orders: Vec<SaleLine>,
    pub reservations: Vec<Reservation>,
    pub deliveries: Vec<Delivery>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralInfo {
    #[serde(deserialize_with = "string_or_false")]
    pub product_name: String,
    #[serde(deserialize_with = "string_or_false")]
    pub product_code: String,
    #[serde(deserialize_with = "string_or_false")]
    pub lot_name: String,
    #[serde(rename = "fecha_creacion", deserialize_with = "string_or_false")]
    pub created_on: String,
    #[serde(rename = "estado_actual", deserialize_with = "string_or_false")]
    pub state: String,
    #[serde(rename = "ubicacion_actual", deserialize_with = "string_or_false")]
    pub location: String,
    #[serde(rename = "cantidad_actual")]
    pub quantity: f64,
    #[serde(rename = "cantidad_reservada")]
    pub reserved: f64,
    #[serde(rename = "cantidad_disponible")]
    pub available: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryStatistics {
    #[serde(rename = "total_movimientos")]
    pub movements: u32,
    #[serde(rename = "total_entradas")]
    pub receipts: u32,
    #[serde(rename = "total_salidas")]
    pub issues: u32,
    #[serde(rename = "total_ventas")]
    pub sales: u32,
    #[serde(rename = "total_apartados")]
    pub holds: u32,
    #[serde(rename = "total_entregas")]
    pub deliveries: u32,
    #[serde(rename = "dias_en_inventario")]
    pub days_in_stock: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseLine {
    #[serde(rename = "orden_compra", deserialize_with = "string_or_false")]
    pub order: String,
    #[serde(rename = "proveedor", deserialize_with = "string_or_false")]
    pub supplier: String,
    #[serde(rename = "fecha_orden", deserialize_with = "string_or_false")]
    pub ordered_on: String,
    #[serde(rename = "cantidad")]
    pub quantity: f64,
    #[serde(rename = "precio_unitario")]
    pub unit_price: f64,
    pub total: f64,
    #[serde(rename = "moneda", deserialize_with = "string_or_false")]
    pub currency: String,
    #[serde(rename = "estado", deserialize_with = "string_or_false")]
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movement {
    #[serde(rename = "fecha", deserialize_with = "string_or_false")]
    pub date: String,
    #[serde(rename = "tipo", deserialize_with = "string_or_false")]
    pub kind: String,
    #[serde(deserialize_with = "string_or_false")]
    pub icon: String,
    #[serde(rename = "origen", deserialize_with = "string_or_false")]
    pub source: String,
    #[serde(rename = "destino", deserialize_with = "string_or_false")]
    pub destination: String,
    #[serde(rename = "cantidad")]
    pub quantity: f64,
    #[serde(rename = "referencia", deserialize_with = "string_or_false")]
    pub reference: String,
    #[serde(rename = "usuario", deserialize_with = "string_or_false")]
    pub user: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleLine {
    #[serde(rename = "orden_venta", deserialize_with = "string_or_false")]
    pub order: String,
    #[serde(rename = "cliente", deserialize_with = "string_or_false")]
    pub customer: String,
    #[serde(rename = "vendedor", deserialize_with = "string_or_false")]
    pub salesperson: String,
    #[serde(rename = "fecha_orden", deserialize_with = "string_or_false")]
    pub ordered_on: String,
    #[serde(rename = "cantidad")]
    pub quantity: f64,
    #[serde(rename = "precio_unitario")]
    pub unit_price: f64,
    pub total: f64,
    #[serde(rename = "moneda", deserialize_with = "string_or_false")]
    pub currency: String,
    #[serde(rename = "estado", deserialize_with = "string_or_false")]
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reservation {
    #[serde(rename = "tipo", deserialize_with = "string_or_false")]
    pub kind: String,
    #[serde(deserialize_with = "string_or_false")]
    pub partner: String,
    #[serde(rename = "fecha_inicio", deserialize_with = "string_or_false")]
    pub start_date: String,
    #[serde(rename = "fecha_expiracion", deserialize_with = "string_or_false")]
    pub expiration_date: String,
    #[serde(rename = "estado", deserialize_with = "string_or_false")]
    pub state: String,
    #[serde(rename = "notas", deserialize_with = "string_or_false")]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delivery {
    #[serde(rename = "referencia", deserialize_with = "string_or_false")]
    pub reference: String,
    #[serde(rename = "cliente", deserialize_with = "string_or_false")]
    pub customer: String,
    #[serde(rename = "fecha_programada", deserialize_with = "string_or_false")]
    pub scheduled_date: String,
    #[serde(rename = "fecha_efectiva", deserialize_with = "string_or_false")]
    pub done_date: String,
    #[serde(rename = "cantidad")]
    pub quantity: f64,
    #[serde(rename = "origen", deserialize_with = "string_or_false")]
    pub origin: String,
    #[serde(rename = "estado", deserialize_with = "string_or_false")]
    pub state: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_history() {
        let history: LotHistory = serde_json::from_value(json!({
            "general_info": {
                "product_name": "Calacatta",
                "lot_name": "L-1",
                "fecha_creacion": "01/02/2024",
                "cantidad_actual": 5.12
            },
            "statistics": {"total_movimientos": 3, "dias_en_inventario": 41},
            "movements": [{"fecha": "01/02/2024 10:00", "tipo": "Entrada", "referencia": false, "cantidad": 5.12}],
            "has_purchase_permissions": false
        }))
        .unwrap();
        assert_eq!(history.general_info.lot_name, "L-1");
        assert_eq!(history.general_info.product_code, "");
        assert_eq!(history.statistics.days_in_stock, 41);
        assert_eq!(history.movements[0].reference, "");
        assert!(history.sales_orders.is_empty());
        assert!(!history.has_purchase_permissions);
    }
}
