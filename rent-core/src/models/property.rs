use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    #[default]
    Apartment,
    House,
    Room,
    Commercial,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::House => "house",
            Self::Room => "room",
            Self::Commercial => "commercial",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "apartment" => Some(Self::Apartment),
            "house" => Some(Self::House),
            "room" => Some(Self::Room),
            "commercial" => Some(Self::Commercial),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Apartment => "Квартира",
            Self::House => "Дом",
            Self::Room => "Комната",
            Self::Commercial => "Коммерческая недвижимость",
        }
    }
}

/// A rentable property. Contracts refer to it by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub kind: PropertyKind,
    pub area: Option<Decimal>,
    pub rooms: Option<u32>,
    pub description: Option<String>,
}

/// For creating new properties (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProperty {
    pub name: String,
    pub address: String,
    pub kind: PropertyKind,
    pub area: Option<Decimal>,
    pub rooms: Option<u32>,
    pub description: Option<String>,
}

impl NewProperty {
    pub fn into_property(self, id: i64) -> Property {
        Property {
            id,
            name: self.name,
            address: self.address,
            kind: self.kind,
            area: self.area,
            rooms: self.rooms,
            description: self.description,
        }
    }
}
