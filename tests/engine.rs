use stay_scout::config::{Pacing, ScoutConfig};
use stay_scout::driver::HtmlDocument;
use stay_scout::models::{
    DateTarget, RoomRecord, IMAGE_NOT_FOUND, PRICE_NOT_VISIBLE, RATING_NOT_AVAILABLE,
};
use stay_scout::scenario::{
    inspect_detail, open_first_result, run_search_for, stay_dates, DetailTarget, Validation,
};
use stay_scout::scrapers::{FilterOutcome, WaitSpec};
use std::time::Duration;

fn fast_config() -> ScoutConfig {
    let fast = WaitSpec::new(Duration::from_millis(80), Duration::from_millis(5));
    ScoutConfig {
        pacing: Pacing::instant(),
        standard_wait: fast,
        short_wait: fast,
        ..ScoutConfig::default()
    }
}

const SEARCH_PAGE: &str = r#"
<html><body>
  <div class="cookie-overlay">
    <button id="onetrust-accept-btn-handler">Accept</button>
  </div>
  <form>
    <input name="ss" placeholder="Where are you going?">
    <ul>
      <li data-testid="autocomplete-result">Goa, India</li>
      <li data-testid="autocomplete-result">North Goa, Goa, India</li>
    </ul>
    <button type="button" data-testid="date-display-field-start">Check-in date</button>
    <button type="submit" data-testid="searchbox-submit-button">Search</button>
  </form>
</body></html>"#;

fn month_page(days: &[DateTarget], with_next: bool) -> String {
    let cells: String = days
        .iter()
        .map(|d| {
            format!(
                r#"<td data-date="{}"><span>{}</span></td>"#,
                d.key(),
                d.date().format("%-d")
            )
        })
        .collect();
    let next = if with_next {
        r#"<button type="button" data-testid="calendar-next" data-month="1">Next month</button>"#
    } else {
        ""
    };
    format!(
        r#"<html><body>
          <div data-testid="searchbox-datepicker-calendar">
            {next}
            <table><tbody><tr>{cells}</tr></tbody></table>
          </div>
          <button type="submit" data-testid="searchbox-submit-button">Search</button>
        </body></html>"#
    )
}

const RESULTS_PAGE: &str = r#"
<html><body>
  <aside>
    <div data-filters-group="class">
      <input type="checkbox" name="class=4" id="f-class-4">
      <label for="f-class-4">4 stars</label>
    </div>
    <div data-testid="filters-group-meals">
      <span>Breakfast included</span>
    </div>
  </aside>
  <main>
    <div data-testid="property-card">
      <img src="https://img.example/sea-breeze.jpg">
      <a data-testid="title-link" href="/hotel/in/sea-breeze.html">
        <div data-testid="title">Sea Breeze Resort</div>
      </a>
      <div data-testid="review-score">Scored 8.9</div>
      <span data-testid="price-and-discounted-price">₹ 18,450</span>
      <div>Breakfast included</div>
      <div>Free cancellation</div>
    </div>
    <div data-testid="property-card">
      <img src="https://img.example/palm-grove.jpg">
      <a data-testid="title-link" href="/hotel/in/palm-grove.html">
        <div data-testid="title">Palm Grove Inn</div>
      </a>
      <span data-testid="price-and-discounted-price">₹ 7,200</span>
    </div>
    <div data-testid="property-card">
      <a data-testid="title-link" href="/hotel/in/fort-view.html">
        <div data-testid="title">Fort View Stay</div>
      </a>
      <div data-testid="review-score">Scored 7.4</div>
    </div>
  </main>
</body></html>"#;

fn search_flow(check_in: DateTarget, check_out: DateTarget) -> HtmlDocument {
    let earlier = check_in.plus_days(-10).unwrap();
    HtmlDocument::from_pages([
        SEARCH_PAGE.to_string(),
        month_page(&[earlier], true),
        month_page(&[check_in, check_out], false),
        RESULTS_PAGE.to_string(),
    ])
    .with_url("https://www.booking.com/searchresults.html?ss=Goa")
    .on_click("[data-testid='date-display-field-start']", 1)
    .unwrap()
    .on_click("button[data-month='1']", 2)
    .unwrap()
    .on_click("button[type='submit']", 3)
    .unwrap()
}

#[test]
fn search_flow_reaches_results_and_extracts_cards() {
    let config = fast_config();
    let (check_in, check_out) = stay_dates(&config, DateTarget::today()).unwrap();
    let doc = search_flow(check_in, check_out);

    let outcome = run_search_for(&doc, &config, check_in, check_out).unwrap();

    assert_eq!(doc.current_page(), 3);
    assert_eq!(
        doc.typed(),
        vec![("input[name=ss]".to_string(), "Goa, India".to_string())]
    );
    assert!(doc.keys().is_empty());

    let clicks = doc.clicks();
    assert!(clicks.contains(&"li[data-testid=autocomplete-result] \"Goa, India\"".to_string()));
    for date in [check_in, check_out] {
        let cell = format!("td[data-date={}]", date.key());
        assert!(
            clicks.iter().any(|c| c.starts_with(&cell)),
            "no click on {cell}: {clicks:?}"
        );
    }
    assert!(clicks.contains(&"label[for=f-class-4] \"4 stars\"".to_string()));
    assert!(clicks.contains(&"span \"Breakfast included\"".to_string()));

    let filters: Vec<_> = outcome.filters.iter().map(|f| (f.name, f.outcome)).collect();
    assert_eq!(
        filters,
        vec![
            ("4+ stars", FilterOutcome::Applied { strategy: 0 }),
            ("breakfast included", FilterOutcome::Applied { strategy: 1 }),
            ("free cancellation", FilterOutcome::NotFound),
        ]
    );

    assert_eq!(outcome.validation, Validation::Passed { count: 3 });
    assert_eq!(outcome.listings.len(), 3);

    let first = &outcome.listings[0];
    assert_eq!(first.name, "Sea Breeze Resort");
    assert_eq!(first.price, "₹ 18,450");
    assert_eq!(first.rating, "Scored 8.9");
    assert_eq!(first.image_url, "https://img.example/sea-breeze.jpg");
    assert!(first.breakfast_included);
    assert!(first.free_cancellation);

    let second = &outcome.listings[1];
    assert_eq!(second.rating, RATING_NOT_AVAILABLE);
    assert!(!second.breakfast_included);
    assert!(!second.free_cancellation);

    let third = &outcome.listings[2];
    assert_eq!(third.price, PRICE_NOT_VISIBLE);
    assert_eq!(third.image_url, IMAGE_NOT_FOUND);

    let target = open_first_result(&doc, &config).unwrap();
    assert_eq!(
        target,
        DetailTarget::NewPage("https://www.booking.com/hotel/in/sea-breeze.html".to_string())
    );
}

#[test]
fn too_few_results_fail_validation_without_error() {
    let config = ScoutConfig {
        min_expected_results: 5,
        ..fast_config()
    };
    let (check_in, check_out) = stay_dates(&config, DateTarget::today()).unwrap();
    let doc = search_flow(check_in, check_out);

    let outcome = run_search_for(&doc, &config, check_in, check_out).unwrap();

    assert_eq!(outcome.validation, Validation::Failed { count: 3 });
    assert_eq!(
        outcome.validation,
        Validation::Failed {
            count: outcome.listings.len()
        }
    );
}

#[test]
fn missing_check_in_date_aborts_the_search() {
    let config = fast_config();
    let (check_in, check_out) = stay_dates(&config, DateTarget::today()).unwrap();
    let doc = search_flow(check_in, check_out);
    let unreachable = check_in.plus_days(400).unwrap();

    let err = run_search_for(&doc, &config, unreachable, unreachable.plus_days(3).unwrap())
        .unwrap_err();

    assert!(err.to_string().contains(&unreachable.key()), "{err}");
    assert_ne!(doc.current_page(), 3);
}

#[test]
fn search_outcome_serializes_for_results_file() {
    let config = fast_config();
    let (check_in, check_out) = stay_dates(&config, DateTarget::today()).unwrap();
    let doc = search_flow(check_in, check_out);

    let outcome = run_search_for(&doc, &config, check_in, check_out).unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["check_in"], check_in.key());
    assert_eq!(json["validation"]["status"], "passed");
    assert_eq!(json["validation"]["count"], 3);
    assert_eq!(json["filters"][2]["outcome"]["status"], "not_found");
    assert_eq!(json["listings"][0]["name"], "Sea Breeze Resort");
}

const DETAIL_PAGE: &str = r#"
<html><body>
  <div id="hotel_reviews" style="display: none">Guest reviews</div>
  <section id="room-list">
    <div class="room-header"><span>Room type</span><span>Price for 3 nights</span></div>
    <ul>
      <li data-testid="room-row">
        <h3>Price for 3 nights</h3>
      </li>
      <li data-testid="room-row">
        <h3>Ocean View King</h3>
        <div><span class="amount">₹ 15,200</span><small>+₹ 1,800 taxes and charges</small></div>
      </li>
      <li data-testid="room-row">
        <h3>Garden Twin</h3>
        <p>Sold out for your dates</p>
      </li>
      <li data-testid="room-row">
        <h3>Ocean View King</h3>
        <div><span class="amount">₹ 13,000</span></div>
      </li>
    </ul>
  </section>
  <div id="hotel_policy">House rules</div>
</body></html>"#;

#[test]
fn detail_page_rooms_and_sections() {
    let doc = HtmlDocument::new(DETAIL_PAGE).with_url("https://www.booking.com/hotel/in/sea-breeze.html");

    let detail = inspect_detail(&doc, &fast_config()).unwrap();

    assert_eq!(detail.url, "https://www.booking.com/hotel/in/sea-breeze.html");
    assert!(detail.availability_reached);
    assert_eq!(
        detail.rooms,
        vec![
            RoomRecord::new("Ocean View King", "₹ 15,200"),
            RoomRecord::new("Garden Twin", ""),
        ]
    );
    assert!(!detail.rooms[1].has_price());
    assert!(detail.reviews_or_policies_visible);
}

#[test]
fn detail_page_without_availability_yields_no_rooms() {
    let doc = HtmlDocument::new("<html><body><main>Photos</main></body></html>");

    let detail = inspect_detail(&doc, &fast_config()).unwrap();

    assert!(!detail.availability_reached);
    assert!(detail.rooms.is_empty());
    assert!(!detail.reviews_or_policies_visible);
    let scrolls = doc
        .scripts()
        .iter()
        .filter(|s| s.contains("scrollBy"))
        .count();
    assert_eq!(scrolls, 10);
}
