use super::{falsy_as_none, string_or_false};
use serde::{Deserialize, Deserializer, Serialize};

/// Grid search criteria. Blank criteria are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "is_blank")]
    pub product_name: Option<String>,
    #[serde(rename = "almacen_id", skip_serializing_if = "is_blank")]
    pub warehouse_id: Option<String>,
    #[serde(rename = "ubicacion_id", skip_serializing_if = "is_blank")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub tipo: Option<String>,
    #[serde(rename = "categoria_name", skip_serializing_if = "is_blank")]
    pub category_name: Option<String>,
    #[serde(rename = "grupo", skip_serializing_if = "is_blank")]
    pub group: Option<String>,
    #[serde(rename = "acabado", skip_serializing_if = "is_blank")]
    pub finish: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub color: Option<String>,
    #[serde(rename = "grosor", skip_serializing_if = "is_blank")]
    pub thickness: Option<String>,
    /// Comma separated lot numbers
    #[serde(rename = "numero_serie", skip_serializing_if = "is_blank")]
    pub lot_numbers: Option<String>,
    #[serde(rename = "bloque", skip_serializing_if = "is_blank")]
    pub block: Option<String>,
    #[serde(rename = "pedimento", skip_serializing_if = "is_blank")]
    pub customs_entry: Option<String>,
    #[serde(rename = "contenedor", skip_serializing_if = "is_blank")]
    pub container: Option<String>,
    #[serde(rename = "atado", skip_serializing_if = "is_blank")]
    pub bundle: Option<String>,
    #[serde(rename = "alto_min", skip_serializing_if = "is_blank")]
    pub min_height: Option<String>,
    #[serde(rename = "ancho_min", skip_serializing_if = "is_blank")]
    pub min_width: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub price_min: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub price_max: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl SearchFilters {
    /// True when at least one criterion is set
    pub fn is_active(&self) -> bool {
        [
            &self.product_name,
            &self.warehouse_id,
            &self.location_id,
            &self.tipo,
            &self.category_name,
            &self.group,
            &self.finish,
            &self.color,
            &self.thickness,
            &self.lot_numbers,
            &self.block,
            &self.customs_entry,
            &self.container,
            &self.bundle,
            &self.min_height,
            &self.min_width,
            &self.price_min,
            &self.price_max,
        ]
        .into_iter()
        .any(|v| !is_blank(v))
    }
}

/// One product row of the grid with its stock totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductGroup {
    pub product_id: i64,
    #[serde(deserialize_with = "string_or_false")]
    pub product_name: String,
    #[serde(deserialize_with = "string_or_false")]
    pub product_code: String,
    #[serde(deserialize_with = "string_or_false")]
    pub categ_name: String,
    #[serde(deserialize_with = "string_or_false")]
    pub tipo: String,
    pub quant_ids: Vec<i64>,
    pub stock_qty: f64,
    pub stock_plates: u32,
    pub hold_qty: f64,
    pub hold_plates: u32,
    pub committed_qty: f64,
    pub committed_plates: u32,
    pub available_qty: f64,
    pub available_plates: u32,
    pub transit_qty: f64,
    pub transit_plates: u32,
    pub transit_hold_qty: f64,
    pub transit_hold_plates: u32,
    pub transit_committed_qty: f64,
    pub transit_committed_plates: u32,
    pub transit_available_qty: f64,
    pub transit_available_plates: u32,
    #[serde(deserialize_with = "string_or_false")]
    pub color: String,
}

/// Result of `get_inventory_grouped_by_product`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventorySearch {
    pub products: Vec<ProductGroup>,
    /// Requested lot numbers that matched nothing
    pub missing_lots: Vec<String>,
}

impl<'de> Deserialize<'de> for InventorySearch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Older backends return the bare product list
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            List(Vec<ProductGroup>),
            Object {
                #[serde(default)]
                products: Vec<ProductGroup>,
                #[serde(default)]
                missing_lots: Vec<String>,
            },
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::List(products) => InventorySearch {
                products,
                missing_lots: Vec::new(),
            },
            Wire::Object {
                products,
                missing_lots,
            } => InventorySearch {
                products,
                missing_lots,
            },
        })
    }
}

/// Active hold on a quant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantHold {
    pub id: i64,
    #[serde(deserialize_with = "string_or_false")]
    pub partner_name: String,
    #[serde(rename = "proyecto_nombre", deserialize_with = "string_or_false")]
    pub project_name: String,
    #[serde(rename = "arquitecto_nombre", deserialize_with = "string_or_false")]
    pub architect_name: String,
    #[serde(rename = "vendedor_nombre", deserialize_with = "string_or_false")]
    pub salesperson_name: String,
    #[serde(rename = "fecha_inicio", deserialize_with = "string_or_false")]
    pub start_date: String,
    #[serde(rename = "fecha_expiracion", deserialize_with = "string_or_false")]
    pub expiration_date: String,
    #[serde(rename = "notas", deserialize_with = "string_or_false")]
    pub notes: String,
}

/// One lot (quant) row under an expanded product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantDetail {
    pub id: i64,
    #[serde(deserialize_with = "falsy_as_none")]
    pub lot_id: Option<i64>,
    #[serde(deserialize_with = "string_or_false")]
    pub lot_name: String,
    pub location_id: i64,
    #[serde(deserialize_with = "string_or_false")]
    pub location_name: String,
    #[serde(deserialize_with = "string_or_false")]
    pub location_usage: String,
    pub quantity: f64,
    pub reserved_quantity: f64,
    #[serde(rename = "grosor", deserialize_with = "falsy_as_none")]
    pub thickness: Option<f64>,
    #[serde(rename = "alto", deserialize_with = "falsy_as_none")]
    pub height: Option<f64>,
    #[serde(rename = "ancho", deserialize_with = "falsy_as_none")]
    pub width: Option<f64>,
    #[serde(deserialize_with = "string_or_false")]
    pub color: String,
    #[serde(deserialize_with = "string_or_false")]
    pub tipo: String,
    #[serde(rename = "bloque", deserialize_with = "string_or_false")]
    pub block: String,
    #[serde(rename = "atado", deserialize_with = "string_or_false")]
    pub bundle: String,
    #[serde(rename = "pedimento", deserialize_with = "string_or_false")]
    pub customs_entry: String,
    #[serde(rename = "contenedor", deserialize_with = "string_or_false")]
    pub container: String,
    #[serde(rename = "referencia_proveedor", deserialize_with = "string_or_false")]
    pub supplier_reference: String,
    #[serde(rename = "cantidad_fotos")]
    pub photo_count: u32,
    #[serde(rename = "detalles_placa", deserialize_with = "string_or_false")]
    pub plate_details: String,
    #[serde(rename = "tiene_hold")]
    pub has_hold: bool,
    #[serde(deserialize_with = "falsy_as_none")]
    pub hold_info: Option<QuantHold>,
    #[serde(rename = "en_orden_venta")]
    pub in_sale_order: bool,
    pub sale_order_ids: Vec<i64>,
}
