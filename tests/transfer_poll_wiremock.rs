use anyhow::Result;
use paywatch::config::PortalConfig;
use paywatch::credentials::SessionData;
use paywatch::models::TransferRecord;
use paywatch::portal::{PortalClient, TransferPoll};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TRANSFER_PATH: &str = "/consume/record/items.htm";
const LOGIN_PATH: &str = "/login/index.htm";
const KEEPALIVE_PATH: &str = "/portal/i.htm";

const HISTORY_BODY: &str = r#"
    <html><body><table>
      <tr class="record-list">
        <td class="time">2016.01.02 03:04</td>
        <td class="memo">
          <ul>
            <li class="name emoji-li">Lunch split</li>
            <li><div class="consumeBizNo">20160102000001</div></li>
          </ul>
        </td>
        <td class="amount income">+ 25.00</td>
        <td class="balance">125.00</td>
        <td class="from"><ul><li class="name">Alice</li></ul></td>
      </tr>
      <tr class="record-list">
        <td class="time">2016.01.02 04:05</td>
        <td class="memo">
          <ul>
            <li class="name emoji-li">Groceries</li>
            <li><div class="consumeBizNo">20160102000002</div></li>
          </ul>
        </td>
        <td class="amount outcome">- 40.00</td>
        <td class="balance">85.00</td>
        <td class="from"><ul><li class="name">Bob</li></ul></td>
      </tr>
    </table></body></html>
"#;

fn portal_config(server: &MockServer) -> PortalConfig {
    PortalConfig {
        login_url: format!("{}{}", server.uri(), LOGIN_PATH),
        transfer_url: format!("{}{}", server.uri(), TRANSFER_PATH),
        keepalive_url: Some(format!("{}{}", server.uri(), KEEPALIVE_PATH)),
        ..PortalConfig::default()
    }
}

fn session() -> SessionData {
    SessionData::new().with_cookie("SESSIONID", "abc123")
}

#[tokio::test]
async fn poll_extracts_income_rows_using_session_cookies() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TRANSFER_PATH))
        .and(header("cookie", "SESSIONID=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(HISTORY_BODY, "text/html"))
        .mount(&server)
        .await;

    let client = PortalClient::new(&portal_config(&server), &session())?;

    let table = match client.fetch_transfers().await? {
        TransferPoll::Records(Some(table)) => table,
        other => panic!("expected a populated table, got {other:?}"),
    };

    assert_eq!(table.len(), 1);
    assert_eq!(
        table.get("20160102000001"),
        Some(&TransferRecord {
            id: "20160102000001".to_string(),
            time: "2016.01.02 03:04".to_string(),
            description: "Lunch split".to_string(),
            income: "+ 25.00".to_string(),
            balance: "125.00".to_string(),
            sender: "Alice".to_string(),
        })
    );
    // the outgoing row never makes it into the table
    assert!(table.get("20160102000002").is_none());

    Ok(())
}

#[tokio::test]
async fn redirect_to_login_page_means_session_expired() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TRANSFER_PATH))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}{}", server.uri(), LOGIN_PATH).as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>login</html>", "text/html"))
        .mount(&server)
        .await;

    let client = PortalClient::new(&portal_config(&server), &session())?;

    assert_eq!(client.fetch_transfers().await?, TransferPoll::Expired);

    Ok(())
}

#[tokio::test]
async fn page_without_rows_yields_absent_table_every_poll() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TRANSFER_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body><p>nothing yet</p></body></html>", "text/html"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = PortalClient::new(&portal_config(&server), &session())?;

    assert_eq!(client.fetch_transfers().await?, TransferPoll::Records(None));
    assert_eq!(client.fetch_transfers().await?, TransferPoll::Records(None));

    Ok(())
}

#[tokio::test]
async fn polling_twice_rebuilds_an_identical_table() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TRANSFER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(HISTORY_BODY, "text/html"))
        .mount(&server)
        .await;

    let client = PortalClient::new(&portal_config(&server), &session())?;

    let first = client.fetch_transfers().await?;
    let second = client.fetch_transfers().await?;
    assert_eq!(first, second);

    Ok(())
}

#[tokio::test]
async fn keep_alive_visits_the_configured_page() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(KEEPALIVE_PATH))
        .and(header("cookie", "SESSIONID=abc123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = PortalClient::new(&portal_config(&server), &session())?;
    client.keep_alive().await;

    Ok(())
}

#[tokio::test]
async fn server_error_fails_the_poll_pass() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TRANSFER_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = PortalClient::new(&portal_config(&server), &session())?;

    assert!(client.fetch_transfers().await.is_err());

    Ok(())
}
