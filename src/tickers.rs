//! Static ticker directory backing the symbol autocomplete.

use serde::Serialize;

/// One listed instrument in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticker {
    pub symbol: &'static str,
    pub name: &'static str,
    pub exchange: &'static str,
    pub sector: &'static str,
}

const fn t(
    symbol: &'static str,
    name: &'static str,
    exchange: &'static str,
    sector: &'static str,
) -> Ticker {
    Ticker {
        symbol,
        name,
        exchange,
        sector,
    }
}

/// Major US-listed tickers across NYSE, NASDAQ, and AMEX.
pub static STOCK_TICKERS: &[Ticker] = &[
    // Mega cap tech
    t("AAPL", "Apple Inc.", "NASDAQ", "Technology"),
    t("MSFT", "Microsoft Corporation", "NASDAQ", "Technology"),
    t("GOOGL", "Alphabet Inc. Class A", "NASDAQ", "Technology"),
    t("GOOG", "Alphabet Inc. Class C", "NASDAQ", "Technology"),
    t("AMZN", "Amazon.com Inc.", "NASDAQ", "Consumer Discretionary"),
    t("TSLA", "Tesla Inc.", "NASDAQ", "Automotive"),
    t("META", "Meta Platforms Inc.", "NASDAQ", "Technology"),
    t("NVDA", "NVIDIA Corporation", "NASDAQ", "Technology"),
    t("AVGO", "Broadcom Inc.", "NASDAQ", "Technology"),
    t("ORCL", "Oracle Corporation", "NASDAQ", "Technology"),
    // Financial services
    t("BRK.A", "Berkshire Hathaway Inc. Class A", "NYSE", "Financial Services"),
    t("BRK.B", "Berkshire Hathaway Inc. Class B", "NYSE", "Financial Services"),
    t("JPM", "JPMorgan Chase & Co.", "NYSE", "Financial Services"),
    t("V", "Visa Inc.", "NYSE", "Financial Services"),
    t("MA", "Mastercard Incorporated", "NYSE", "Financial Services"),
    t("BAC", "Bank of America Corporation", "NYSE", "Financial Services"),
    t("WFC", "Wells Fargo & Company", "NYSE", "Financial Services"),
    t("GS", "The Goldman Sachs Group Inc.", "NYSE", "Financial Services"),
    t("MS", "Morgan Stanley", "NYSE", "Financial Services"),
    t("AXP", "American Express Company", "NYSE", "Financial Services"),
    // Healthcare & pharmaceuticals
    t("UNH", "UnitedHealth Group Incorporated", "NYSE", "Healthcare"),
    t("JNJ", "Johnson & Johnson", "NYSE", "Healthcare"),
    t("PFE", "Pfizer Inc.", "NYSE", "Healthcare"),
    t("ABBV", "AbbVie Inc.", "NYSE", "Healthcare"),
    t("LLY", "Eli Lilly and Company", "NYSE", "Healthcare"),
    t("MRK", "Merck & Co. Inc.", "NYSE", "Healthcare"),
    t("TMO", "Thermo Fisher Scientific Inc.", "NYSE", "Healthcare"),
    t("ABT", "Abbott Laboratories", "NYSE", "Healthcare"),
    t("ISRG", "Intuitive Surgical Inc.", "NASDAQ", "Healthcare"),
    t("DHR", "Danaher Corporation", "NYSE", "Healthcare"),
    // Consumer & retail
    t("WMT", "Walmart Inc.", "NYSE", "Consumer Staples"),
    t("HD", "The Home Depot Inc.", "NYSE", "Consumer Discretionary"),
    t("PG", "The Procter & Gamble Company", "NYSE", "Consumer Staples"),
    t("COST", "Costco Wholesale Corporation", "NASDAQ", "Consumer Staples"),
    t("KO", "The Coca-Cola Company", "NYSE", "Consumer Staples"),
    t("PEP", "PepsiCo Inc.", "NASDAQ", "Consumer Staples"),
    t("MCD", "McDonald's Corporation", "NYSE", "Consumer Discretionary"),
    t("NKE", "NIKE Inc.", "NYSE", "Consumer Discretionary"),
    t("LOW", "Lowe's Companies Inc.", "NYSE", "Consumer Discretionary"),
    t("SBUX", "Starbucks Corporation", "NASDAQ", "Consumer Discretionary"),
    // Entertainment & media
    t("DIS", "The Walt Disney Company", "NYSE", "Communication Services"),
    t("NFLX", "Netflix Inc.", "NASDAQ", "Communication Services"),
    t("CMCSA", "Comcast Corporation", "NASDAQ", "Communication Services"),
    t("T", "AT&T Inc.", "NYSE", "Communication Services"),
    t("VZ", "Verizon Communications Inc.", "NYSE", "Communication Services"),
    t("CHTR", "Charter Communications Inc.", "NASDAQ", "Communication Services"),
    // Energy
    t("XOM", "Exxon Mobil Corporation", "NYSE", "Energy"),
    t("CVX", "Chevron Corporation", "NYSE", "Energy"),
    t("COP", "ConocoPhillips", "NYSE", "Energy"),
    t("EOG", "EOG Resources Inc.", "NYSE", "Energy"),
    t("SLB", "Schlumberger Limited", "NYSE", "Energy"),
    t("PXD", "Pioneer Natural Resources Company", "NYSE", "Energy"),
    // Industrials
    t("BA", "The Boeing Company", "NYSE", "Industrials"),
    t("CAT", "Caterpillar Inc.", "NYSE", "Industrials"),
    t("GE", "General Electric Company", "NYSE", "Industrials"),
    t("HON", "Honeywell International Inc.", "NASDAQ", "Industrials"),
    t("UPS", "United Parcel Service Inc.", "NYSE", "Industrials"),
    t("RTX", "Raytheon Technologies Corporation", "NYSE", "Industrials"),
    t("LMT", "Lockheed Martin Corporation", "NYSE", "Industrials"),
    t("DE", "Deere & Company", "NYSE", "Industrials"),
    t("MMM", "3M Company", "NYSE", "Industrials"),
    t("FDX", "FedEx Corporation", "NYSE", "Industrials"),
    // Additional tech
    t("CRM", "Salesforce Inc.", "NYSE", "Technology"),
    t("ADBE", "Adobe Inc.", "NASDAQ", "Technology"),
    t("PYPL", "PayPal Holdings Inc.", "NASDAQ", "Technology"),
    t("INTC", "Intel Corporation", "NASDAQ", "Technology"),
    t("AMD", "Advanced Micro Devices Inc.", "NASDAQ", "Technology"),
    t("QCOM", "QUALCOMM Incorporated", "NASDAQ", "Technology"),
    t("TXN", "Texas Instruments Incorporated", "NASDAQ", "Technology"),
    t("IBM", "International Business Machines Corporation", "NYSE", "Technology"),
    t("NOW", "ServiceNow Inc.", "NYSE", "Technology"),
    t("INTU", "Intuit Inc.", "NASDAQ", "Technology"),
    t("MU", "Micron Technology Inc.", "NASDAQ", "Technology"),
    t("AMAT", "Applied Materials Inc.", "NASDAQ", "Technology"),
    t("LRCX", "Lam Research Corporation", "NASDAQ", "Technology"),
    t("ADI", "Analog Devices Inc.", "NASDAQ", "Technology"),
    // Growth
    t("SHOP", "Shopify Inc.", "NYSE", "Technology"),
    t("SQ", "Block Inc.", "NYSE", "Technology"),
    t("ROKU", "Roku Inc.", "NASDAQ", "Technology"),
    t("TWLO", "Twilio Inc.", "NYSE", "Technology"),
    t("ZM", "Zoom Video Communications Inc.", "NASDAQ", "Technology"),
    t("DOCU", "DocuSign Inc.", "NASDAQ", "Technology"),
    t("SNOW", "Snowflake Inc.", "NYSE", "Technology"),
    t("PLTR", "Palantir Technologies Inc.", "NYSE", "Technology"),
    t("U", "Unity Software Inc.", "NYSE", "Technology"),
    t("RBLX", "Roblox Corporation", "NYSE", "Technology"),
    // EVs & clean energy
    t("NIO", "NIO Inc.", "NYSE", "Automotive"),
    t("XPEV", "XPeng Inc.", "NYSE", "Automotive"),
    t("LI", "Li Auto Inc.", "NASDAQ", "Automotive"),
    t("RIVN", "Rivian Automotive Inc.", "NASDAQ", "Automotive"),
    t("LCID", "Lucid Group Inc.", "NASDAQ", "Automotive"),
    t("F", "Ford Motor Company", "NYSE", "Automotive"),
    t("GM", "General Motors Company", "NYSE", "Automotive"),
    // Biotechnology
    t("GILD", "Gilead Sciences Inc.", "NASDAQ", "Biotechnology"),
    t("AMGN", "Amgen Inc.", "NASDAQ", "Biotechnology"),
    t("BIIB", "Biogen Inc.", "NASDAQ", "Biotechnology"),
    t("REGN", "Regeneron Pharmaceuticals Inc.", "NASDAQ", "Biotechnology"),
    t("VRTX", "Vertex Pharmaceuticals Incorporated", "NASDAQ", "Biotechnology"),
    // REITs
    t("AMT", "American Tower Corporation", "NYSE", "Real Estate"),
    t("PLD", "Prologis Inc.", "NYSE", "Real Estate"),
    t("CCI", "Crown Castle International Corp.", "NYSE", "Real Estate"),
    t("EQIX", "Equinix Inc.", "NASDAQ", "Real Estate"),
    t("SPG", "Simon Property Group Inc.", "NYSE", "Real Estate"),
    // Utilities
    t("NEE", "NextEra Energy Inc.", "NYSE", "Utilities"),
    t("SO", "The Southern Company", "NYSE", "Utilities"),
    t("DUK", "Duke Energy Corporation", "NYSE", "Utilities"),
    t("D", "Dominion Energy Inc.", "NYSE", "Utilities"),
    // Materials
    t("LIN", "Linde plc", "NYSE", "Materials"),
    t("APD", "Air Products and Chemicals Inc.", "NYSE", "Materials"),
    t("FCX", "Freeport-McMoRan Inc.", "NYSE", "Materials"),
    t("NEM", "Newmont Corporation", "NYSE", "Materials"),
    // Meme stocks
    t("GME", "GameStop Corp.", "NYSE", "Consumer Discretionary"),
    t("AMC", "AMC Entertainment Holdings Inc.", "NYSE", "Consumer Discretionary"),
    t("BB", "BlackBerry Limited", "NYSE", "Technology"),
    t("NOK", "Nokia Corporation", "NYSE", "Technology"),
    // Chinese ADRs
    t("BABA", "Alibaba Group Holding Limited", "NYSE", "Technology"),
    t("JD", "JD.com Inc.", "NASDAQ", "Consumer Discretionary"),
    t("BIDU", "Baidu Inc.", "NASDAQ", "Technology"),
    t("PDD", "PDD Holdings Inc.", "NASDAQ", "Technology"),
    // ETFs
    t("SPY", "SPDR S&P 500 ETF Trust", "NYSE", "ETF"),
    t("QQQ", "Invesco QQQ Trust", "NASDAQ", "ETF"),
    t("IWM", "iShares Russell 2000 ETF", "NYSE", "ETF"),
    t("VTI", "Vanguard Total Stock Market ETF", "NYSE", "ETF"),
    t("VOO", "Vanguard S&P 500 ETF", "NYSE", "ETF"),
    t("DIA", "SPDR Dow Jones Industrial Average ETF Trust", "NYSE", "ETF"),
    // Crypto-adjacent
    t("COIN", "Coinbase Global Inc.", "NASDAQ", "Financial Services"),
    t("MSTR", "MicroStrategy Incorporated", "NASDAQ", "Technology"),
    t("RIOT", "Riot Platforms Inc.", "NASDAQ", "Technology"),
    t("MARA", "Marathon Digital Holdings Inc.", "NASDAQ", "Technology"),
    // Additional majors
    t("BLK", "BlackRock Inc.", "NYSE", "Financial Services"),
    t("SCHW", "The Charles Schwab Corporation", "NYSE", "Financial Services"),
    t("SPGI", "S&P Global Inc.", "NYSE", "Financial Services"),
    t("ICE", "Intercontinental Exchange Inc.", "NYSE", "Financial Services"),
    t("CME", "CME Group Inc.", "NASDAQ", "Financial Services"),
];

/// Search the directory with autocomplete priority: exact symbol matches
/// first, then symbol prefixes, then company-name substrings. Results are
/// deduplicated and truncated to `limit`.
pub fn search(query: &str, limit: usize) -> Vec<&'static Ticker> {
    if query.is_empty() {
        return Vec::new();
    }

    let term = query.to_uppercase();
    let mut results: Vec<&'static Ticker> = Vec::new();

    let push_unique = |ticker: &'static Ticker, results: &mut Vec<&'static Ticker>| {
        if !results.iter().any(|t| t.symbol == ticker.symbol) {
            results.push(ticker);
        }
    };

    for ticker in STOCK_TICKERS.iter().filter(|t| t.symbol == term) {
        push_unique(ticker, &mut results);
    }
    for ticker in STOCK_TICKERS
        .iter()
        .filter(|t| t.symbol.starts_with(&term) && t.symbol != term)
    {
        push_unique(ticker, &mut results);
    }
    for ticker in STOCK_TICKERS
        .iter()
        .filter(|t| t.name.to_uppercase().contains(&term) && !t.symbol.starts_with(&term))
    {
        push_unique(ticker, &mut results);
    }

    results.truncate(limit);
    results
}

/// Look up a single ticker by (case-insensitive) symbol.
pub fn get_by_symbol(symbol: &str) -> Option<&'static Ticker> {
    STOCK_TICKERS
        .iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_symbol_match_ranks_first() {
        let results = search("T", 10);
        assert_eq!(results[0].symbol, "T");
        // Prefix matches follow the exact one.
        assert!(results.iter().skip(1).all(|t| t.symbol != "T"));
    }

    #[test]
    fn prefix_matches_precede_name_matches() {
        let results = search("AMD", 10);
        assert_eq!(results[0].symbol, "AMD");
    }

    #[test]
    fn name_substring_matches_are_found() {
        let results = search("apple", 10);
        assert!(results.iter().any(|t| t.symbol == "AAPL"));
    }

    #[test]
    fn results_respect_limit_and_are_unique() {
        let results = search("A", 5);
        assert!(results.len() <= 5);
        let mut symbols: Vec<_> = results.iter().map(|t| t.symbol).collect();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), results.len());
    }

    #[test]
    fn empty_query_returns_nothing() {
        assert!(search("", 10).is_empty());
    }

    #[test]
    fn lookup_by_symbol_is_case_insensitive() {
        assert_eq!(get_by_symbol("aapl").unwrap().symbol, "AAPL");
        assert!(get_by_symbol("NOPE").is_none());
    }
}
