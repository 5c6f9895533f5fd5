//! Catalog product record and the rules for building/patching it from loosely typed input.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use utoipa::ToSchema;

/// A catalog entry as persisted in the backing file.
///
/// `name`, `category`, `tag` and `img` hold whatever JSON value was submitted;
/// fields that were never supplied stay absent in the stored JSON.
/// `price` is `null` when the submitted value was not numeric.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct Product {
    pub id: u64,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub name: Option<JsonValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub category: Option<JsonValue>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub tag: Option<JsonValue>,
    #[serde(default = "empty_img")]
    #[schema(value_type = Object)]
    pub img: JsonValue,
}

impl Product {
    /// The image reference when it is a string (uploads are always strings).
    pub fn img_url(&self) -> Option<&str> {
        self.img.as_str()
    }
}

/// Keeps an explicit `null` as `Some(Null)` so it survives a read/write cycle.
fn present<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}

fn empty_img() -> JsonValue {
    JsonValue::String(String::new())
}

/// Raw request fields for create/update, as they arrived (JSON body or multipart text parts).
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub name: Option<JsonValue>,
    pub category: Option<JsonValue>,
    pub price: Option<JsonValue>,
    pub tag: Option<JsonValue>,
    pub img: Option<JsonValue>,
}

impl ProductInput {
    /// Picks the known fields out of a JSON object; unknown keys are ignored.
    pub fn from_json_object(obj: &Map<String, JsonValue>) -> Self {
        Self {
            name: obj.get("name").cloned(),
            category: obj.get("category").cloned(),
            price: obj.get("price").cloned(),
            tag: obj.get("tag").cloned(),
            img: obj.get("img").cloned(),
        }
    }

    /// Records a multipart text part. Later parts with the same name win.
    pub fn set_text(&mut self, field: &str, value: String) {
        let slot = match field {
            "name" => &mut self.name,
            "category" => &mut self.category,
            "price" => &mut self.price,
            "tag" => &mut self.tag,
            "img" => &mut self.img,
            _ => return,
        };
        *slot = Some(JsonValue::String(value));
    }

    /// Builds the fields of a new product. `uploaded_img` takes precedence over the body `img`.
    pub fn into_draft(self, uploaded_img: Option<String>) -> ProductDraft {
        let img = match uploaded_img {
            Some(url) => JsonValue::String(url),
            None => self.img.filter(is_truthy).unwrap_or_else(empty_img),
        };
        ProductDraft {
            name: self.name,
            category: self.category,
            price: self.price.as_ref().and_then(coerce_price),
            tag: self.tag,
            img,
        }
    }

    /// Builds a patch that only touches truthy inputs. The body `img` is never used on update.
    pub fn into_patch(self, uploaded_img: Option<String>) -> ProductPatch {
        ProductPatch {
            name: self.name.filter(is_truthy),
            category: self.category.filter(is_truthy),
            price: self.price.filter(is_truthy).map(|v| coerce_price(&v)),
            tag: self.tag.filter(is_truthy),
            img: uploaded_img,
        }
    }
}

/// A product without an id yet; the store assigns one.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: Option<JsonValue>,
    pub category: Option<JsonValue>,
    pub price: Option<f64>,
    pub tag: Option<JsonValue>,
    pub img: JsonValue,
}

impl ProductDraft {
    pub fn with_id(self, id: u64) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
            tag: self.tag,
            img: self.img,
        }
    }
}

/// Partial update. `None` leaves the stored field as it is.
///
/// `price: Some(None)` sets the price to "not a number" (stored as `null`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<JsonValue>,
    pub category: Option<JsonValue>,
    pub price: Option<Option<f64>>,
    pub tag: Option<JsonValue>,
    pub img: Option<String>,
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product) {
        if let Some(img) = self.img {
            product.img = JsonValue::String(img);
        }
        if let Some(name) = self.name {
            product.name = Some(name);
        }
        if let Some(category) = self.category {
            product.category = Some(category);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(tag) = self.tag {
            product.tag = Some(tag);
        }
    }
}

/// Loose truthiness: `null`, `false`, `0`, and `""` are falsy, everything else is truthy.
pub fn is_truthy(v: &JsonValue) -> bool {
    match v {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Coerces a submitted price to a number.
///
/// Returns `None` for input that is not numeric; such prices are persisted as `null`.
pub fn coerce_price(v: &JsonValue) -> Option<f64> {
    match v {
        JsonValue::Null => Some(0.0),
        JsonValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Some(0.0);
            }
            // Reject "inf"/"nan" spellings that f64::from_str would accept.
            if !s
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
            {
                return None;
            }
            s.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

/// Parses an id path segment. Anything that is not a non-negative integer matches no product.
pub fn parse_product_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<u64>() {
        return Some(id);
    }
    // "3.0" names product 3.
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(v: JsonValue) -> ProductInput {
        ProductInput::from_json_object(v.as_object().unwrap())
    }

    #[test]
    fn price_coercion_follows_number_semantics() {
        assert_eq!(coerce_price(&json!("19.99")), Some(19.99));
        assert_eq!(coerce_price(&json!(" 42 ")), Some(42.0));
        assert_eq!(coerce_price(&json!("")), Some(0.0));
        assert_eq!(coerce_price(&json!(7)), Some(7.0));
        assert_eq!(coerce_price(&json!(true)), Some(1.0));
        assert_eq!(coerce_price(&json!("abc")), None);
        assert_eq!(coerce_price(&json!("inf")), None);
        assert_eq!(coerce_price(&json!("NaN")), None);
        assert_eq!(coerce_price(&json!({"a": 1})), None);
    }

    #[test]
    fn draft_keeps_inputs_and_falls_back_to_body_img() {
        let draft = input(json!({
            "name": "Shirt",
            "category": "Apparel",
            "price": "19.99",
            "tag": "sale",
            "img": "https://cdn.example/shirt.png"
        }))
        .into_draft(None);

        assert_eq!(draft.name, Some(json!("Shirt")));
        assert_eq!(draft.price, Some(19.99));
        assert_eq!(draft.img, "https://cdn.example/shirt.png");

        let uploaded = input(json!({"img": "ignored"})).into_draft(Some("/uploads/a.png".into()));
        assert_eq!(uploaded.img, "/uploads/a.png");

        let empty = ProductInput::default().into_draft(None);
        assert_eq!(empty.img, "");
        assert_eq!(empty.name, None);
        assert_eq!(empty.price, None);
    }

    #[test]
    fn non_string_fields_are_kept_as_submitted() {
        let draft = input(json!({"name": 12, "tag": true, "category": null, "img": 7})).into_draft(None);
        assert_eq!(draft.name, Some(json!(12)));
        assert_eq!(draft.tag, Some(json!(true)));
        assert_eq!(draft.category, Some(JsonValue::Null));
        assert_eq!(draft.img, json!(7));

        let patch = input(json!({"name": ["a", "b"]})).into_patch(None);
        assert_eq!(patch.name, Some(json!(["a", "b"])));
    }

    #[test]
    fn reads_products_with_non_string_fields() {
        let products: Vec<Product> = serde_json::from_str(
            r#"[{"id":1,"name":12,"category":null,"price":5,"tag":true,"img":""},{"id":2,"price":null}]"#,
        )
        .unwrap();

        assert_eq!(products[0].name, Some(json!(12)));
        assert_eq!(products[0].category, Some(JsonValue::Null));
        assert_eq!(products[0].tag, Some(json!(true)));
        assert_eq!(products[1].img, json!(""));
        assert_eq!(
            serde_json::to_value(&products).unwrap(),
            json!([
                {"id": 1, "name": 12, "category": null, "price": 5.0, "tag": true, "img": ""},
                {"id": 2, "price": null, "img": ""}
            ])
        );
    }

    #[test]
    fn patch_skips_falsy_values() {
        let patch = input(json!({
            "name": "",
            "category": null,
            "price": 0,
            "tag": "new",
            "img": "https://ignored.example/x.png"
        }))
        .into_patch(None);

        assert_eq!(
            patch,
            ProductPatch {
                tag: Some(json!("new")),
                ..ProductPatch::default()
            }
        );
    }

    #[test]
    fn patch_with_string_zero_price_sets_zero() {
        let patch = input(json!({"price": "0"})).into_patch(None);
        assert_eq!(patch.price, Some(Some(0.0)));
    }

    #[test]
    fn empty_patch_leaves_product_unchanged() {
        let mut product = Product {
            id: 3,
            name: Some("Mug".into()),
            category: Some("Kitchen".into()),
            price: Some(8.5),
            tag: Some("new".into()),
            img: "/uploads/mug.png".into(),
        };
        let before = product.clone();
        let patch = ProductInput::default().into_patch(None);
        assert_eq!(patch, ProductPatch::default());
        patch.apply(&mut product);
        assert_eq!(product, before);
    }

    #[test]
    fn nan_price_serializes_as_null() {
        let product = ProductDraft {
            name: Some("X".into()),
            category: None,
            price: None,
            tag: None,
            img: json!(""),
        }
        .with_id(1);
        let v = serde_json::to_value(&product).unwrap();
        assert_eq!(v, json!({"id": 1, "name": "X", "price": null, "img": ""}));
    }

    #[test]
    fn product_ids_parse_loosely() {
        assert_eq!(parse_product_id("5"), Some(5));
        assert_eq!(parse_product_id(" 5 "), Some(5));
        assert_eq!(parse_product_id("5.0"), Some(5));
        assert_eq!(parse_product_id("5.5"), None);
        assert_eq!(parse_product_id("abc"), None);
        assert_eq!(parse_product_id("-1"), None);
    }
}
