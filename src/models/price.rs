use serde::{Deserialize, Serialize};

/// Ценовая категория места. Парное место оплачивается как одна категория,
/// его правая половина отдельной цены не имеет.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceCategory {
    Available,
    Vip,
    Couple,
}

impl PriceCategory {
    pub const ALL: [PriceCategory; 3] = [
        PriceCategory::Available,
        PriceCategory::Vip,
        PriceCategory::Couple,
    ];
}

impl std::fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceCategory::Available => f.write_str("available"),
            PriceCategory::Vip => f.write_str("vip"),
            PriceCategory::Couple => f.write_str("couple"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeatTypePrice {
    #[serde(default)]
    pub price: f64,
    // enabled не задается пользователем, а вычисляется по сетке
    #[serde(default)]
    pub enabled: bool,
}

/// Цены по категориям для одного зала.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeatTypePrices {
    #[serde(default)]
    pub available: SeatTypePrice,
    #[serde(default)]
    pub vip: SeatTypePrice,
    #[serde(default)]
    pub couple: SeatTypePrice,
}

impl SeatTypePrices {
    pub fn get(&self, category: PriceCategory) -> &SeatTypePrice {
        match category {
            PriceCategory::Available => &self.available,
            PriceCategory::Vip => &self.vip,
            PriceCategory::Couple => &self.couple,
        }
    }

    fn get_mut(&mut self, category: PriceCategory) -> &mut SeatTypePrice {
        match category {
            PriceCategory::Available => &mut self.available,
            PriceCategory::Vip => &mut self.vip,
            PriceCategory::Couple => &mut self.couple,
        }
    }

    pub fn with_price(mut self, category: PriceCategory, price: f64) -> Self {
        self.get_mut(category).price = price;
        self
    }

    pub fn with_enabled(mut self, category: PriceCategory, enabled: bool) -> Self {
        self.get_mut(category).enabled = enabled;
        self
    }

    /// Включенные категории с неположительной ценой.
    pub fn missing_prices(&self) -> Vec<PriceCategory> {
        PriceCategory::ALL
            .into_iter()
            .filter(|c| {
                let entry = self.get(*c);
                entry.enabled && entry.price <= 0.0
            })
            .collect()
    }
}

/// Обертка `{ "seatTypes": ... }`, в которой цены ходят по API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatPricesPayload {
    #[serde(default)]
    pub seat_types: SeatTypePrices,
}
