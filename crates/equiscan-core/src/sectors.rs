//! Sector classification and the static fallback universe.
//!
//! Classification is a two-step heuristic: a lookup table of well-known
//! NSE tickers, then keyword substring matching against the symbol for
//! everything else. Unmatched symbols land in `"Others"` rather than
//! being dropped; sector balance is a sampling concern, not a filter.

/// Known ticker to sector assignments for liquid NSE names.
const SECTOR_TABLE: &[(&str, &str)] = &[
    // Technology
    ("INFY", "Technology"),
    ("TCS", "Technology"),
    ("WIPRO", "Technology"),
    ("TECHM", "Technology"),
    ("HCLTECH", "Technology"),
    ("LTIM", "Technology"),
    ("COFORGE", "Technology"),
    ("PERSISTENT", "Technology"),
    ("MPHASIS", "Technology"),
    ("TATAELXSI", "Technology"),
    // Financial Services
    ("HDFCBANK", "Financial Services"),
    ("ICICIBANK", "Financial Services"),
    ("SBIN", "Financial Services"),
    ("KOTAKBANK", "Financial Services"),
    ("AXISBANK", "Financial Services"),
    ("BAJFINANCE", "Financial Services"),
    ("BAJAJFINSV", "Financial Services"),
    ("INDUSINDBK", "Financial Services"),
    ("FEDERALBNK", "Financial Services"),
    ("CHOLAFIN", "Financial Services"),
    // Healthcare
    ("SUNPHARMA", "Healthcare"),
    ("DRREDDY", "Healthcare"),
    ("CIPLA", "Healthcare"),
    ("DIVISLAB", "Healthcare"),
    ("APOLLOHOSP", "Healthcare"),
    ("LUPIN", "Healthcare"),
    ("AUROPHARMA", "Healthcare"),
    ("BIOCON", "Healthcare"),
    ("ALKEM", "Healthcare"),
    ("TORNTPHARM", "Healthcare"),
    // Consumer Goods
    ("HINDUNILVR", "Consumer Goods"),
    ("ITC", "Consumer Goods"),
    ("NESTLEIND", "Consumer Goods"),
    ("DABUR", "Consumer Goods"),
    ("GODREJCP", "Consumer Goods"),
    ("BRITANNIA", "Consumer Goods"),
    ("MARICO", "Consumer Goods"),
    ("COLPAL", "Consumer Goods"),
    ("PIDILITIND", "Consumer Goods"),
    ("TATACONSUM", "Consumer Goods"),
    // Industrial
    ("LT", "Industrial"),
    ("SIEMENS", "Industrial"),
    ("ABB", "Industrial"),
    ("HAVELLS", "Industrial"),
    ("CUMMINSIND", "Industrial"),
    ("THERMAX", "Industrial"),
    ("BHEL", "Industrial"),
    ("BEL", "Industrial"),
    ("POLYCAB", "Industrial"),
    // Automotive
    ("TATAMOTORS", "Automotive"),
    ("MARUTI", "Automotive"),
    ("M&M", "Automotive"),
    ("BAJAJ-AUTO", "Automotive"),
    ("EICHERMOT", "Automotive"),
    ("HEROMOTOCO", "Automotive"),
    ("TVSMOTOR", "Automotive"),
    ("ASHOKLEY", "Automotive"),
    // Energy
    ("RELIANCE", "Energy"),
    ("ONGC", "Energy"),
    ("NTPC", "Energy"),
    ("POWERGRID", "Energy"),
    ("TATAPOWER", "Energy"),
    ("ADANIGREEN", "Energy"),
    ("IOC", "Energy"),
    ("BPCL", "Energy"),
    // Materials
    ("TATASTEEL", "Materials"),
    ("JSWSTEEL", "Materials"),
    ("HINDALCO", "Materials"),
    ("ULTRACEMCO", "Materials"),
    ("SHREECEM", "Materials"),
    ("AMBUJACEM", "Materials"),
    ("VEDL", "Materials"),
    ("UPL", "Materials"),
    // Real Estate
    ("DLF", "Real Estate"),
    ("GODREJPROP", "Real Estate"),
    ("OBEROIRLTY", "Real Estate"),
    ("PRESTIGE", "Real Estate"),
    ("BRIGADE", "Real Estate"),
];

/// Substring heuristics applied when the table has no entry.
const SECTOR_KEYWORDS: &[(&str, &[&str])] = &[
    ("Technology", &["TECH", "SOFT", "INFO", "CYBER", "DATA"]),
    ("Financial Services", &["BANK", "FIN", "NBFC", "INSUR", "CAPITAL"]),
    ("Healthcare", &["PHARMA", "HEALTH", "MED", "LAB", "DRUG", "HOSP"]),
    ("Consumer Goods", &["CONSUM", "FOOD", "RETAIL", "FMCG"]),
    ("Industrial", &["ENGG", "INFRA", "CONSTR", "INDUST", "FORGE"]),
    ("Automotive", &["AUTO", "MOTOR", "TYRE", "WHEELS"]),
    ("Energy", &["POWER", "ENERGY", "OIL", "GAS", "PETRO", "SOLAR"]),
    ("Materials", &["STEEL", "CEMENT", "METAL", "CHEM", "PAINT", "ALLOY"]),
    ("Real Estate", &["REALTY", "ESTATE", "PROP", "HOUSING"]),
];

pub const DEFAULT_SECTOR: &str = "Others";

/// Classify a ticker into a sector.
pub fn classify(symbol: &str) -> &'static str {
    let normalized = symbol.trim().to_ascii_uppercase();

    for (ticker, sector) in SECTOR_TABLE {
        if *ticker == normalized {
            return sector;
        }
    }

    for (sector, keywords) in SECTOR_KEYWORDS {
        if keywords.iter().any(|keyword| normalized.contains(keyword)) {
            return sector;
        }
    }

    DEFAULT_SECTOR
}

/// Sector-balanced static universe used when the primary listing source
/// is fully unavailable. (ticker, company name) pairs.
pub const FALLBACK_UNIVERSE: &[(&str, &str)] = &[
    ("TATAMOTORS", "Tata Motors Ltd"),
    ("MARUTI", "Maruti Suzuki India Ltd"),
    ("TVSMOTOR", "TVS Motor Company Ltd"),
    ("BAJFINANCE", "Bajaj Finance Ltd"),
    ("HDFCBANK", "HDFC Bank Ltd"),
    ("FEDERALBNK", "Federal Bank Ltd"),
    ("CHOLAFIN", "Cholamandalam Investment & Finance"),
    ("INFY", "Infosys Ltd"),
    ("TCS", "Tata Consultancy Services"),
    ("WIPRO", "Wipro Ltd"),
    ("TECHM", "Tech Mahindra Ltd"),
    ("PERSISTENT", "Persistent Systems Ltd"),
    ("SUNPHARMA", "Sun Pharmaceutical Industries"),
    ("DRREDDY", "Dr Reddy's Laboratories"),
    ("CIPLA", "Cipla Ltd"),
    ("DIVISLAB", "Divi's Laboratories Ltd"),
    ("LUPIN", "Lupin Ltd"),
    ("PIDILITIND", "Pidilite Industries Ltd"),
    ("DABUR", "Dabur India Ltd"),
    ("GODREJCP", "Godrej Consumer Products"),
    ("MARICO", "Marico Ltd"),
    ("LT", "Larsen & Toubro Ltd"),
    ("HAVELLS", "Havells India Ltd"),
    ("CUMMINSIND", "Cummins India Ltd"),
    ("TATAPOWER", "Tata Power Company Ltd"),
    ("ONGC", "Oil & Natural Gas Corporation"),
    ("TATASTEEL", "Tata Steel Ltd"),
    ("JSWSTEEL", "JSW Steel Ltd"),
    ("ULTRACEMCO", "UltraTech Cement Ltd"),
    ("DLF", "DLF Ltd"),
    ("GODREJPROP", "Godrej Properties Ltd"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn table_hits_win_over_keywords() {
        assert_eq!(classify("INFY"), "Technology");
        assert_eq!(classify("tatamotors"), "Automotive");
        assert_eq!(classify("DLF"), "Real Estate");
    }

    #[test]
    fn keyword_fallback_classifies_unknown_tickers() {
        assert_eq!(classify("SOMEBANK"), "Financial Services");
        assert_eq!(classify("NEWAUTOPARTS"), "Automotive");
        assert_eq!(classify("GREATPOWER"), "Energy");
    }

    #[test]
    fn unmatched_symbols_default_to_others() {
        assert_eq!(classify("ZZZQQQ"), DEFAULT_SECTOR);
    }

    #[test]
    fn fallback_universe_is_sector_balanced() {
        let sectors: BTreeSet<&str> = FALLBACK_UNIVERSE
            .iter()
            .map(|(symbol, _)| classify(symbol))
            .collect();
        assert!(
            sectors.len() >= 8,
            "fallback list should span most sectors, got {sectors:?}"
        );
    }
}
