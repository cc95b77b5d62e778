//! Готовые схемы залов. Шаблон - чистая функция от размера сетки.

use serde::{Deserialize, Serialize};

use super::SeatGrid;
use crate::models::SeatType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Default,
    Standard,
    Premium,
    Intimate,
}

impl Template {
    pub const ALL: [Template; 4] = [
        Template::Default,
        Template::Standard,
        Template::Premium,
        Template::Intimate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Template::Default => "Default Empty",
            Template::Standard => "Standard Theater",
            Template::Premium => "Premium Theater",
            Template::Intimate => "Intimate Theater",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Template::Default => "All seats are standard seats.",
            Template::Standard => "Standard seats with a VIP band across the middle rows.",
            Template::Premium => "VIP seats in the back half and couple seats in the back corners.",
            Template::Intimate => "A center aisle and couple seats along the back row.",
        }
    }

    pub fn generate(self, rows: usize, cols: usize) -> SeatGrid {
        let mut cells = vec![vec![SeatType::Available; cols]; rows];
        if rows == 0 || cols == 0 {
            return SeatGrid::from_rows(cells);
        }

        match self {
            Template::Default => {}
            Template::Standard => {
                // VIP в средней трети рядов, без крайних колонок
                let vip_start = rows / 3;
                let vip_end = (2 * rows / 3).min(rows - 1);
                for line in &mut cells[vip_start..=vip_end] {
                    for cell in line.iter_mut().take(cols.saturating_sub(1)).skip(1) {
                        *cell = SeatType::Vip;
                    }
                }
            }
            Template::Premium => {
                for line in &mut cells[rows / 2..] {
                    line.fill(SeatType::Vip);
                }
                if rows > 2 && cols > 3 {
                    let back = &mut cells[rows - 1];
                    back[0] = SeatType::Couple;
                    back[1] = SeatType::SupCouple;
                    back[cols - 2] = SeatType::Couple;
                    back[cols - 1] = SeatType::SupCouple;
                }
            }
            Template::Intimate => {
                let aisle = cols / 2;
                for line in cells.iter_mut() {
                    line[aisle] = SeatType::Unavailable;
                }
                let back = &mut cells[rows - 1];
                for col in (0..cols - 1).step_by(2) {
                    if col != aisle && col + 1 != aisle {
                        back[col] = SeatType::Couple;
                        back[col + 1] = SeatType::SupCouple;
                    }
                }
            }
        }

        SeatGrid::from_rows(cells)
    }
}

impl std::str::FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Template::Default),
            "standard" => Ok(Template::Standard),
            "premium" => Ok(Template::Premium),
            "intimate" => Ok(Template::Intimate),
            other => Err(format!("unknown template '{}'", other)),
        }
    }
}
