/// Integration tests for live extraction against a mock WebForms portal
use cfe_tariffs::{
    provider::{stored, PortalScraper, ScheduleProvider, StoredSchedule},
    Capacity, TariffError,
};
use httpmock::prelude::*;
use rust_decimal_macros::dec;
use std::io::Write;

const RATE_TABLE: &str = r#"
    <table id="tblTarifas">
      <tr><td><b>Consumo básico</b></td><td>0.854</td><td>Por cada uno de los primeros 75 kWh</td></tr>
      <tr><td>Consumo intermedio</td><td>1.037</td><td>Por cada uno de los siguientes 100 kWh</td></tr>
      <tr><td>Consumo excedente</td><td>3.008</td><td>Por cada kWh adicional</td></tr>
    </table>
"#;

fn portal_page(rate_table: &str) -> String {
    let months: String = (1..=12)
        .map(|m| format!(r#"<option value="{m}">{m}</option>"#))
        .collect();
    let summers: String = (2..=5)
        .map(|m| format!(r#"<option value="{m}">{m}</option>"#))
        .collect();

    format!(
        r#"<html><body>
        <form method="post" action="./tarifa" id="form1">
          <input type="hidden" name="__EVENTTARGET" value="" />
          <input type="hidden" name="__EVENTARGUMENT" value="" />
          <input type="hidden" name="__VIEWSTATE" value="dDwtMTA4NjY0" />
          <input type="hidden" name="__EVENTVALIDATION" value="L2dFbWw" />
          <table>
            <tr><td><span>Consultar tarifas de:</span></td>
                <td><select name="ctl00$MainContent$ddlAnio">
                  <option value="2023">2023</option>
                  <option selected="selected" value="2024">2024</option>
                </select></td></tr>
            <tr><td>Elige el mes en que comienza el verano en tu localidad</td>
                <td><select name="ctl00$MainContent$ddlVerano">{summers}</select></td></tr>
            <tr><td>Elige el mes que deseas consultar</td>
                <td><select name="ctl00$MainContent$ddlMes">{months}</select></td></tr>
          </table>
          {rate_table}
        </form>
        </body></html>"#
    )
}

#[tokio::test]
async fn test_fetch_live_walks_every_summer_and_month() {
    let server = MockServer::start_async().await;
    let page = portal_page(RATE_TABLE);

    let get_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/tarifa");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(page.clone());
        })
        .await;
    let post_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/tarifa");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(page.clone());
        })
        .await;

    let scraper = PortalScraper::new(server.url("/tarifa"));
    let schedule = scraper.fetch_live(2024).await.unwrap();

    assert_eq!(schedule.year, 2024);
    let starts: Vec<u8> = schedule.summer_groups.iter().map(|g| g.start_month).collect();
    assert_eq!(starts, vec![2, 3, 4, 5]);
    for group in &schedule.summer_groups {
        let months: Vec<u8> = group.months.iter().map(|m| m.month).collect();
        assert_eq!(months, (1..=12).collect::<Vec<u8>>());
    }

    let july = schedule.month_rate(4, 7).unwrap();
    assert_eq!(july.tiers.len(), 3);
    assert_eq!(july.tiers[0].name, "Consumo básico");
    assert_eq!(july.tiers[0].capacity, Capacity::kwh(75));
    assert_eq!(july.tiers[1].unit_price, dec!(1.037));
    assert!(july.tiers[2].capacity.is_unbounded());

    // One load, one year selection, four summer selections, 48 month selections
    get_mock.assert_hits_async(1).await;
    post_mock.assert_hits_async(53).await;
    assert_eq!(scraper.open_sessions(), 0);
}

#[tokio::test]
async fn test_year_not_offered_is_extraction_error() {
    let server = MockServer::start_async().await;
    let page = portal_page(RATE_TABLE);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/tarifa");
            then.status(200).body(page.clone());
        })
        .await;

    let scraper = PortalScraper::new(server.url("/tarifa"));
    match scraper.fetch_live(2031).await {
        Err(TariffError::Extraction(msg)) => assert!(msg.contains("2031")),
        other => panic!("Expected Extraction error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_rate_table_is_extraction_error() {
    let server = MockServer::start_async().await;
    let page = portal_page("<p>Tarifa no disponible</p>");

    server
        .mock_async(|when, then| {
            when.path("/tarifa");
            then.status(200).body(page.clone());
        })
        .await;

    let scraper = PortalScraper::new(server.url("/tarifa"));
    match scraper.fetch_live(2024).await {
        Err(TariffError::Extraction(msg)) => assert!(msg.contains("summer 2 month 1")),
        other => panic!("Expected Extraction error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_extraction_error() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/tarifa");
            then.status(503).body("Service Unavailable");
        })
        .await;

    let scraper = PortalScraper::new(server.url("/tarifa"));
    match scraper.fetch_live(2024).await {
        Err(TariffError::Extraction(msg)) => assert!(msg.contains("503")),
        other => panic!("Expected Extraction error, got {:?}", other),
    }
    assert_eq!(scraper.open_sessions(), 0);
}

#[tokio::test]
async fn test_session_is_released_when_extraction_fails_midway() {
    let server = MockServer::start_async().await;
    let page = portal_page(RATE_TABLE);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/tarifa");
            then.status(200).body(page.clone());
        })
        .await;
    let post_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/tarifa");
            then.status(500).body("Runtime Error");
        })
        .await;

    let scraper = PortalScraper::new(server.url("/tarifa"));
    for _ in 0..2 {
        let result = scraper.fetch_live(2024).await;
        assert!(matches!(result, Err(TariffError::Extraction(_))));
        assert_eq!(scraper.open_sessions(), 0);
    }
    post_mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn test_scraped_and_stored_schedules_are_interchangeable() {
    let server = MockServer::start_async().await;
    let page = portal_page(RATE_TABLE);

    server
        .mock_async(|when, then| {
            when.path("/tarifa");
            then.status(200).body(page.clone());
        })
        .await;

    let scraper = PortalScraper::new(server.url("/tarifa"));
    let scraped = scraper.fetch(2024).await.unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", stored::to_document(&scraped).unwrap()).unwrap();

    let providers: Vec<Box<dyn ScheduleProvider>> = vec![
        Box::new(scraper),
        Box::new(StoredSchedule::new(file.path())),
    ];

    for provider in &providers {
        let schedule = provider.fetch(2024).await.unwrap();
        assert_eq!(schedule, scraped, "provider {} differs", provider.name());

        let allocation = cfe_tariffs::quote(&schedule, 4, 7, 200).unwrap();
        assert_eq!(allocation.total_cost(), dec!(0.854) * dec!(75) + dec!(1.037) * dec!(100) + dec!(3.008) * dec!(25));
    }
}
