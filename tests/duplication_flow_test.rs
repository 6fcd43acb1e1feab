use httpmock::prelude::*;
use item_duplicator::core::workflow::{DestinationResult, RunMode};
use item_duplicator::domain::model::OutcomeAction;
use item_duplicator::{
    AutoApprove, AutoDecline, DuplicationEngine, MondayClient, WorkflowConfig, WorkflowRunner,
};
use serde_json::{json, Value};

const TWO_DESTINATIONS: &str = r#"{
    "templates": {
        "crm": {
            "description": "Lead to account",
            "column_mappings": [
                {"source": "text_src", "dest": "text_dst", "name": "Company", "type": "text"},
                {"source": "link_src", "dest": "link_dst", "name": "Website", "type": "link"}
            ]
        }
    },
    "workflows": [{
        "id": "leads",
        "name": "Leads to Accounts",
        "source": {"board_id": "100", "group_id": "new_leads", "board_name": "Leads"},
        "destinations": [
            {"board_id": 200, "group_id": "topics", "board_name": "Accounts", "template": "crm"},
            {
                "board_id": 300,
                "group_id": "inbox",
                "board_name": "Archive",
                "template": "crm",
                "overrides": {"link_src": "link_archive"}
            }
        ]
    }]
}"#;

const ONE_DESTINATION: &str = r#"{
    "templates": {
        "crm": {
            "column_mappings": [
                {"source": "text_src", "dest": "text_dst", "name": "Company"}
            ]
        }
    },
    "workflows": [{
        "id": "leads",
        "name": "Leads to Accounts",
        "source": {"board_id": 100, "group_id": "new_leads", "board_name": "Leads"},
        "destinations": [
            {"board_id": 200, "group_id": "topics", "board_name": "Accounts", "template": "crm"}
        ]
    }]
}"#;

fn source_item(id: &str, name: &str, group: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "group": {"id": group, "title": "New Leads"},
        "column_values": [
            {"id": "text_src", "text": "Acme HQ", "value": "\"Acme HQ\"", "type": "text"},
            {
                "id": "link_src",
                "text": "Acme - https://acme.test",
                "value": "{\"url\":\"https://acme.test\",\"text\":\"Acme\"}",
                "type": "link"
            },
            {"id": "notes", "text": "", "value": null, "type": "long-text"}
        ]
    })
}

fn items_response(items: Vec<Value>) -> Value {
    json!({"data": {"boards": [{"items_page": {"cursor": null, "items": items}}]}})
}

fn board_filter(board_id: u64) -> String {
    format!(r#""boardId":["{}"]"#, board_id)
}

#[tokio::test]
async fn test_single_item_creates_and_updates_across_destinations() -> anyhow::Result<()> {
    let server = MockServer::start();

    let source_find = server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("query_params")
            .body_contains(board_filter(100));
        then.status(200)
            .json_body(items_response(vec![source_item("11", "Acme Corp", "new_leads")]));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("query_params")
            .body_contains(board_filter(200));
        then.status(200).json_body(items_response(vec![]));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("query_params")
            .body_contains(board_filter(300));
        then.status(200).json_body(items_response(vec![json!({
            "id": "555",
            "name": "Acme Corp",
            "group": {"id": "inbox", "title": "Inbox"},
            "column_values": []
        })]));
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("create_item(")
            .body_contains(r#""boardId":"200""#)
            .body_contains(r#""groupId":"topics""#)
            .body_contains(r#""itemName":"Acme Corp""#)
            .body_contains(r#"\"text_dst\":\"Acme HQ\""#)
            .body_contains(r#"\"link_dst\":"#);
        then.status(200)
            .json_body(json!({"data": {"create_item": {"id": "900", "name": "Acme Corp"}}}));
    });
    let update = server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("change_multiple_column_values(")
            .body_contains(r#""itemId":"555""#)
            .body_contains(r#"\"link_archive\":"#);
        then.status(200).json_body(
            json!({"data": {"change_multiple_column_values": {"id": "555", "name": "Acme Corp"}}}),
        );
    });

    let config = WorkflowConfig::from_json_str(TWO_DESTINATIONS)?;
    let workflow = config.require_enabled_workflow("leads")?;
    let engine = DuplicationEngine::new(MondayClient::new("secret", server.url("/v2"))?, AutoApprove);
    let runner = WorkflowRunner::new(&config, &engine);

    let report = runner
        .run(workflow, &RunMode::SingleItem("Acme Corp".to_string()))
        .await?;

    source_find.assert_hits(2);
    create.assert();
    update.assert();
    assert_eq!(report.failed_destinations(), 0);
    assert_eq!(report.destinations.len(), 2);

    match &report.destinations[0].result {
        Ok(DestinationResult::Single(outcome)) => {
            assert_eq!(outcome.action, OutcomeAction::Created);
            assert_eq!(outcome.dest_item_id.as_deref(), Some("900"));
            assert!(!outcome.was_updated);
            assert_eq!(outcome.mapped_columns, 2);
            assert_eq!(outcome.unmapped_columns, 0);
        }
        other => panic!("unexpected result for first destination: {:?}", other),
    }
    match &report.destinations[1].result {
        Ok(DestinationResult::Single(outcome)) => {
            assert_eq!(outcome.action, OutcomeAction::Updated);
            assert_eq!(outcome.dest_item_id.as_deref(), Some("555"));
            assert!(outcome.was_updated);
        }
        other => panic!("unexpected result for second destination: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_missing_source_item_is_reported_per_destination() -> anyhow::Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v2").body_contains("query_params");
        then.status(200).json_body(items_response(vec![]));
    });
    let writes = server.mock(|when, then| {
        when.method(POST).path("/v2").body_contains("mutation");
        then.status(500);
    });

    let config = WorkflowConfig::from_json_str(TWO_DESTINATIONS)?;
    let workflow = config.require_enabled_workflow("leads")?;
    let engine = DuplicationEngine::new(MondayClient::new("secret", server.url("/v2"))?, AutoApprove);

    let report = WorkflowRunner::new(&config, &engine)
        .run(workflow, &RunMode::SingleItem("Ghost Inc".to_string()))
        .await?;

    writes.assert_hits(0);
    assert_eq!(report.failed_destinations(), 2);
    let message = report.destinations[0].result.as_ref().unwrap_err();
    assert!(message.contains("Ghost Inc"));
    Ok(())
}

#[tokio::test]
async fn test_failing_destination_does_not_stop_the_next() -> anyhow::Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("query_params")
            .body_contains(board_filter(100));
        then.status(200)
            .json_body(items_response(vec![source_item("11", "Acme Corp", "new_leads")]));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("query_params")
            .body_contains(board_filter(200));
        then.status(500).body("upstream unavailable");
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("query_params")
            .body_contains(board_filter(300));
        then.status(200).json_body(items_response(vec![]));
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("create_item(")
            .body_contains(r#""boardId":"300""#);
        then.status(200)
            .json_body(json!({"data": {"create_item": {"id": "901", "name": "Acme Corp"}}}));
    });

    let config = WorkflowConfig::from_json_str(TWO_DESTINATIONS)?;
    let workflow = config.require_enabled_workflow("leads")?;
    let engine = DuplicationEngine::new(MondayClient::new("secret", server.url("/v2"))?, AutoApprove);

    let report = WorkflowRunner::new(&config, &engine)
        .run(workflow, &RunMode::SingleItem("Acme Corp".to_string()))
        .await?;

    create.assert();
    assert_eq!(report.failed_destinations(), 1);
    assert!(report.destinations[0].result.is_err());
    assert!(matches!(
        &report.destinations[1].result,
        Ok(DestinationResult::Single(outcome)) if outcome.action == OutcomeAction::Created
    ));
    Ok(())
}

#[tokio::test]
async fn test_batch_continues_after_item_failure() -> anyhow::Result<()> {
    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("items_page(limit: $limit)")
            .body_contains(board_filter(100));
        then.status(200).json_body(items_response(vec![
            source_item("11", "Acme Corp", "new_leads"),
            source_item("12", "Beta Ltd", "new_leads"),
            source_item("13", "Elsewhere", "closed"),
        ]));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("query_params")
            .body_contains(board_filter(200));
        then.status(200).json_body(items_response(vec![]));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("create_item(")
            .body_contains(r#""itemName":"Acme Corp""#);
        then.status(200)
            .json_body(json!({"data": {"create_item": {"id": "900", "name": "Acme Corp"}}}));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("create_item(")
            .body_contains(r#""itemName":"Beta Ltd""#);
        then.status(200)
            .json_body(json!({"errors": [{"message": "invalid column value"}]}));
    });

    let config = WorkflowConfig::from_json_str(ONE_DESTINATION)?;
    let workflow = config.require_enabled_workflow("leads")?;
    let engine = DuplicationEngine::new(MondayClient::new("secret", server.url("/v2"))?, AutoApprove);

    let report = WorkflowRunner::new(&config, &engine)
        .run(workflow, &RunMode::Batch)
        .await?;

    list.assert();
    let Ok(DestinationResult::Batch(batch)) = &report.destinations[0].result else {
        panic!("expected a batch result, got {:?}", report.destinations[0].result);
    };
    assert_eq!(batch.total_items, 2);
    assert_eq!(batch.created(), 1);
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].item_name, "Beta Ltd");
    assert!(batch.failures[0].error.contains("invalid column value"));
    Ok(())
}

#[tokio::test]
async fn test_declined_preview_writes_nothing() -> anyhow::Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("query_params")
            .body_contains(board_filter(100));
        then.status(200)
            .json_body(items_response(vec![source_item("11", "Acme Corp", "new_leads")]));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .body_contains("query_params")
            .body_contains(board_filter(200));
        then.status(200).json_body(items_response(vec![]));
    });
    let writes = server.mock(|when, then| {
        when.method(POST).path("/v2").body_contains("mutation");
        then.status(500);
    });

    let config = WorkflowConfig::from_json_str(ONE_DESTINATION)?;
    let workflow = config.require_enabled_workflow("leads")?;
    let engine = DuplicationEngine::new(MondayClient::new("secret", server.url("/v2"))?, AutoDecline);

    let report = WorkflowRunner::new(&config, &engine)
        .run(workflow, &RunMode::SingleItem("Acme Corp".to_string()))
        .await?;

    writes.assert_hits(0);
    match &report.destinations[0].result {
        Ok(DestinationResult::Single(outcome)) => {
            assert_eq!(outcome.action, OutcomeAction::Cancelled);
            assert_eq!(outcome.dest_item_id, None);
            assert_eq!(outcome.mapped_columns, 0);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}
