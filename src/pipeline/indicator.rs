//! The three Gapminder indicators tracked by the pipeline

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A socioeconomic indicator loaded from its own wide-format table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Indicator {
    /// 0-5 year-olds dying per 1000 born
    ChildMortality,
    /// GDP per capita, PPP-dollar inflation-adjusted
    Income,
    /// Average number of years a newborn child would live
    LifeExpectancy,
}

impl Indicator {
    /// All indicators, in merge order
    pub const ALL: [Indicator; 3] = [
        Indicator::ChildMortality,
        Indicator::Income,
        Indicator::LifeExpectancy,
    ];

    /// Column holding the raw indicator value in the merged table
    pub fn column(&self) -> &'static str {
        match self {
            Indicator::ChildMortality => "child_mortality_per_1000_born",
            Indicator::Income => "income_per_person",
            Indicator::LifeExpectancy => "life_expectancy_years",
        }
    }

    /// Column holding the rolling average of the indicator
    pub fn average_column(&self) -> &'static str {
        match self {
            Indicator::ChildMortality => "avg_child_mortality",
            Indicator::Income => "avg_income",
            Indicator::LifeExpectancy => "avg_life_years",
        }
    }

    /// File name of the Gapminder export for this indicator
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Indicator::ChildMortality => "child_mortality_0_5_year_olds_dying_per_1000_born.xlsx",
            Indicator::Income => "income_per_person_gdppercapita_ppp_inflation_adjusted.xlsx",
            Indicator::LifeExpectancy => "life_expectancy_years.xlsx",
        }
    }

    /// Human-readable axis label
    pub fn label(&self) -> &'static str {
        match self {
            Indicator::ChildMortality => "child mortality per 1000 born",
            Indicator::Income => "income per person",
            Indicator::LifeExpectancy => "life expectancy years",
        }
    }

    /// Chart title for a rolling average of `window` years
    pub fn plot_title(&self, window: usize) -> String {
        format!("{}-Year MA of {}", window, self.label())
    }

    /// Look up an indicator by either its raw or its average column name
    pub fn from_column(name: &str) -> Option<Indicator> {
        Self::ALL
            .into_iter()
            .find(|i| i.column() == name || i.average_column() == name)
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Indicator::ChildMortality => "child-mortality",
            Indicator::Income => "income",
            Indicator::LifeExpectancy => "life-expectancy",
        };
        write!(f, "{}", name)
    }
}
