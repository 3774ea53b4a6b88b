use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use swipe_session::models::{
    Confidence, MarketCapBucket, PeBucket, PerformanceBucket, RiskTier, SwipeCandidate,
};
use swipe_session::session::{SessionState, SwipeSession, WriteOutcome};

const HELP: &str = "\
Commands:
  l | left                 skip the current stock
  r | right [confidence]   queue it (conservative, bullish, very-bullish)
  s | save                 save it for later
  refresh                  drop the buffer and fetch again
  sector <name|all>        filter by sector
  cap <small|mid|large|any>
  risk <low|medium|high|any>
  perf <label|any>         e.g. \"Today's Gainers (>5%)\"
  pe <0-15|15-25|25-40|40+|any>
  hide-owned               toggle hiding stocks you already own
  watch <SYM> [note]       add to watchlist
  unwatch <SYM>            remove from watchlist
  watchlist                show watchlist
  history                  show locally stored swipes
  status                   show session state
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Left,
    Right(Option<Confidence>),
    Save,
    Refresh,
    Sector(Option<String>),
    MarketCap(Option<MarketCapBucket>),
    Risk(Option<RiskTier>),
    Performance(Option<PerformanceBucket>),
    PeRange(Option<PeBucket>),
    ToggleHideOwned,
    Watch(String, Option<String>),
    Unwatch(String),
    Watchlist,
    History,
    Status,
    Help,
    Quit,
}

fn is_any(arg: &str) -> bool {
    matches!(arg.to_lowercase().as_str(), "any" | "all" | "none" | "clear")
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };

        let cmd = match word.to_lowercase().as_str() {
            "l" | "left" | "skip" => Command::Left,
            "r" | "right" | "queue" => {
                if rest.is_empty() {
                    Command::Right(None)
                } else {
                    let c = Confidence::from_str_loose(rest)
                        .ok_or_else(|| format!("unknown confidence '{}'", rest))?;
                    Command::Right(Some(c))
                }
            }
            "s" | "save" => Command::Save,
            "refresh" => Command::Refresh,
            "sector" if !rest.is_empty() => {
                if is_any(rest) || rest.to_lowercase().starts_with("all") {
                    Command::Sector(None)
                } else {
                    Command::Sector(Some(rest.to_string()))
                }
            }
            "cap" if !rest.is_empty() => Command::MarketCap(parse_bucket(
                rest,
                MarketCapBucket::from_str_loose,
                "market cap",
            )?),
            "risk" if !rest.is_empty() => {
                Command::Risk(parse_bucket(rest, RiskTier::from_str_loose, "risk level")?)
            }
            "perf" if !rest.is_empty() => Command::Performance(parse_bucket(
                rest,
                PerformanceBucket::from_str_loose,
                "performance bucket",
            )?),
            "pe" if !rest.is_empty() => {
                Command::PeRange(parse_bucket(rest, PeBucket::from_str_loose, "P/E range")?)
            }
            "hide-owned" => Command::ToggleHideOwned,
            "watch" if !rest.is_empty() => {
                let (symbol, note) = match rest.split_once(char::is_whitespace) {
                    Some((s, n)) => (s.to_string(), Some(n.trim().to_string())),
                    None => (rest.to_string(), None),
                };
                Command::Watch(symbol, note)
            }
            "unwatch" if !rest.is_empty() => Command::Unwatch(rest.to_string()),
            "watchlist" => Command::Watchlist,
            "history" => Command::History,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            "" => return Err("empty command".to_string()),
            other => return Err(format!("unknown command '{}' (try 'help')", other)),
        };
        Ok(cmd)
    }
}

fn parse_bucket<T>(
    arg: &str,
    parse: impl Fn(&str) -> Option<T>,
    what: &str,
) -> Result<Option<T>, String> {
    if is_any(arg) {
        return Ok(None);
    }
    parse(arg)
        .map(Some)
        .ok_or_else(|| format!("unknown {} '{}'", what, arg))
}

/// Interactive terminal front end for a swipe session.
pub struct Swiper {
    session: SwipeSession,
}

impl Swiper {
    pub fn new(session: SwipeSession) -> Self {
        Self { session }
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("Swiper is now running. Type 'help' for commands, Ctrl+C to stop.");
        self.session.initialize().await;
        self.show_current();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match Command::parse(&line) {
                        Ok(Command::Quit) => break,
                        Ok(cmd) => self.handle(cmd).await,
                        Err(msg) => println!("{}", msg),
                    }
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    async fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Left => self.swipe(|s| s.swipe_left()).await,
            Command::Right(confidence) => self.swipe(|s| s.swipe_right(confidence)).await,
            Command::Save => self.swipe(|s| s.save_for_later()).await,
            Command::Refresh => {
                self.session.refresh_stocks().await;
                self.show_current();
            }
            Command::Sector(sector) => {
                let mut filters = self.session.filters().clone();
                filters.sector = sector;
                self.apply_filters(filters).await;
            }
            Command::MarketCap(bucket) => {
                let mut filters = self.session.filters().clone();
                filters.market_cap = bucket;
                self.apply_filters(filters).await;
            }
            Command::Risk(risk) => {
                let mut filters = self.session.filters().clone();
                filters.risk_level = risk;
                self.apply_filters(filters).await;
            }
            Command::Performance(bucket) => {
                let mut filters = self.session.filters().clone();
                filters.performance = bucket;
                self.apply_filters(filters).await;
            }
            Command::PeRange(bucket) => {
                let mut filters = self.session.filters().clone();
                filters.pe_range = bucket;
                self.apply_filters(filters).await;
            }
            Command::ToggleHideOwned => {
                let filters = self.session.filters().clone();
                let hide = !filters.hide_owned;
                self.apply_filters(filters.hiding_owned(hide)).await;
            }
            Command::Watch(symbol, note) => {
                match self
                    .session
                    .client()
                    .add_to_watchlist(&symbol, note.as_deref())
                    .await
                {
                    Ok(()) => println!("Watching {}", symbol.to_uppercase()),
                    Err(e) => println!("{}", e),
                }
            }
            Command::Unwatch(symbol) => {
                match self.session.client().remove_from_watchlist(&symbol).await {
                    Ok(()) => println!("Stopped watching {}", symbol.to_uppercase()),
                    Err(e) => println!("{}", e),
                }
            }
            Command::Watchlist => {
                let symbols = self.session.client().get_watchlist().await;
                if symbols.is_empty() {
                    println!("Watchlist is empty");
                } else {
                    println!("Watchlist: {}", symbols.join(", "));
                }
            }
            Command::History => match self.session.client().history().entries().await {
                Ok(entries) if entries.is_empty() => println!("No locally stored swipes"),
                Ok(entries) => {
                    for r in entries.iter().rev().take(20) {
                        let conf = r.confidence.map(|c| format!(" ({})", c)).unwrap_or_default();
                        println!(
                            "  {}  {:<6} {}{}",
                            r.timestamp.format("%Y-%m-%d %H:%M:%S"),
                            r.action,
                            r.symbol,
                            conf
                        );
                    }
                }
                Err(e) => println!("Failed to read history: {}", e),
            },
            Command::Status => self.print_status(),
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
    }

    async fn swipe<F>(&mut self, act: F)
    where
        F: FnOnce(&mut SwipeSession) -> Option<swipe_session::models::SwipeRecord>,
    {
        if act(&mut self.session).is_none() {
            println!("Nothing to swipe");
        }
        if self.session.current().is_none() {
            self.session.settle().await;
        }
        self.show_current();
    }

    async fn apply_filters(&mut self, filters: swipe_session::models::FilterCriteria) {
        self.session.update_filters(filters);
        self.session.settle().await;
        self.show_current();
    }

    fn show_current(&mut self) {
        self.session.poll();
        match self.session.state() {
            SessionState::Ready => {
                if let Some(c) = self.session.current() {
                    print_candidate(c);
                }
            }
            SessionState::Exhausted => {
                let msg = self
                    .session
                    .error()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                println!("{} (try 'refresh' or change filters)", msg);
            }
            SessionState::Loading => println!("Loading..."),
            SessionState::Idle => println!("No stocks loaded yet"),
        }
    }

    fn print_status(&self) {
        println!(
            "State: {} | filters: {} | buffered: {} | owned: {} | generation: {}",
            self.session.state(),
            self.session.filters(),
            self.session.queue().len(),
            self.session.portfolio().len(),
            self.session.generation()
        );
    }

    async fn shutdown(&mut self) {
        info!("Shutting down, flushing swipe writes...");
        let outcomes = self.session.flush().await;
        let dropped = outcomes
            .iter()
            .filter(|o| **o == WriteOutcome::Dropped)
            .count();
        if dropped > 0 {
            warn!("{} of {} swipes could not be stored", dropped, outcomes.len());
        } else {
            info!("{} swipes stored", outcomes.len());
        }
    }
}

fn print_candidate(c: &SwipeCandidate) {
    let sign = if c.change_percent >= 0.0 { "+" } else { "" };
    println!();
    println!("  {}  {}", c.symbol, c.name);
    println!(
        "  ${:.2}  {}{:.2}%  | {} | cap {} | risk {}",
        c.price, sign, c.change_percent, c.sector, c.market_cap, c.risk
    );
    if let Some(pe) = c.pe {
        print!("  P/E {:.1}", pe);
        if let Some(y) = c.dividend_yield {
            print!("  yield {:.2}%", y);
        }
        println!();
    }
    if let Some(news) = &c.news_summary {
        println!("  {}", news);
    }
    if c.already_owned {
        println!("  (already in your portfolio)");
    }
    println!("  [l]eft / [r]ight [confidence] / [s]ave");
}
