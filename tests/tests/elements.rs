//! Element handles: statuses, property writes, boundaries and traversal.

use pretty_assertions::assert_eq;
use vgraph_tests::prelude::*;

mod statuses {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: status_follows_each_transition ==========
    #[tokio::test]
    async fn test_status_follows_each_transition() {
        // GIVEN a new node
        let mut graph = repo("family").await;
        let id = graph.add_node("Person").await.unwrap().id().to_string();
        {
            let node = graph.get_node(&id).await.unwrap();
            assert_eq!(node.status().await.unwrap(), Status::Created);

            // WHEN it is written before its first commit
            node.set_property("given", "Ada").await.unwrap();

            // THEN it stays created
            assert_eq!(node.status().await.unwrap(), Status::Created);
        }

        // WHEN committed, updated and deleted
        commit(&mut graph, "birth").await;
        let node = graph.get_node(&id).await.unwrap();
        assert_eq!(node.status().await.unwrap(), Status::Clean);
        node.set_property("given", "Augusta").await.unwrap();
        assert_eq!(node.status().await.unwrap(), Status::Updated);
        graph.remove_node(&id).await.unwrap();

        // THEN the deleted offset sits on top of the update
        assert_eq!(node.status().await.unwrap(), Status::DeletedUpdated);
        assert_eq!(node.get_property("given").await, Err(VGraphError::Deleted));
        assert_eq!(
            node.set_property("given", "Ada").await,
            Err(VGraphError::Deleted)
        );
    }

    // ========== TEST: created_then_deleted_leaves_no_trace ==========
    #[tokio::test]
    async fn test_created_then_deleted_leaves_no_trace() {
        // GIVEN a node and an edge created in the same window
        let mut graph = repo("family").await;
        let a = graph.add_node("Person").await.unwrap().id().to_string();
        let b = graph.add_node("Person").await.unwrap().id().to_string();
        graph.add_edge("Child", &a, &b).await.unwrap();

        // WHEN one endpoint is removed before committing
        graph.remove_node(&a).await.unwrap();

        // THEN neither it nor its edge can be observed or committed
        assert_eq!(graph.get_node(&a).await.err(), Some(VGraphError::NodeNotFound));
        let commit = commit(&mut graph, "only b").await;
        expect_commit(&commit, |c| c.created(1).linked(0).referenced(0));
        assert_eq!(commit.nodes()[0].id(), b);
    }

    // ========== TEST: reset_restores_committed_state ==========
    #[tokio::test]
    async fn test_reset_restores_committed_state() {
        // GIVEN a committed pair joined by an edge
        let mut graph = repo("family").await;
        let a = graph.add_node("Person").await.unwrap().id().to_string();
        let b = graph.add_node("Person").await.unwrap().id().to_string();
        graph
            .get_node(&a)
            .await
            .unwrap()
            .set_properties(props! { "given" => "Ada", "born" => 1815 })
            .await
            .unwrap();
        let edge = graph.add_edge("Child", &a, &b).await.unwrap().id().to_string();
        graph
            .get_edge(&edge)
            .await
            .unwrap()
            .set_property("kind", "birth")
            .await
            .unwrap();
        commit(&mut graph, "family").await;

        // WHEN every kind of pending change is made
        graph
            .get_node(&a)
            .await
            .unwrap()
            .set_property("given", "Augusta")
            .await
            .unwrap();
        graph.get_node(&a).await.unwrap().remove_property("born").await.unwrap();
        graph.remove_node(&b).await.unwrap();
        let extra = graph.add_node("Person").await.unwrap().id().to_string();
        assert!(graph.is_dirty());

        // THEN reset brings back exactly what was committed
        graph.reset().await.unwrap();
        assert!(!graph.is_dirty());
        let node = graph.get_node(&a).await.unwrap();
        assert_eq!(
            node.get_properties().await.unwrap(),
            props! { "given" => "Ada", "born" => 1815 }
        );
        assert_eq!(node.status().await.unwrap(), Status::Clean);
        assert_eq!(graph.get_node(&b).await.unwrap().status().await.unwrap(), Status::Clean);
        let edge = graph.get_edge(&edge).await.unwrap();
        assert_eq!(edge.get_properties().await.unwrap(), props! { "kind" => "birth" });
        assert_eq!(graph.get_node(&extra).await.err(), Some(VGraphError::NodeNotFound));
        assert_eq!(graph.get_nodes(&[]).await.unwrap().len(), 2);
    }
}

mod properties {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: no_op_write_keeps_graph_clean ==========
    #[tokio::test]
    async fn test_no_op_write_keeps_graph_clean() {
        // GIVEN a committed node
        let mut graph = repo("family").await;
        let id = graph.add_node("Person").await.unwrap().id().to_string();
        graph
            .get_node(&id)
            .await
            .unwrap()
            .set_property("given", "Ada")
            .await
            .unwrap();
        commit(&mut graph, "birth").await;

        // WHEN writing the same value and removing an absent key
        let node = graph.get_node(&id).await.unwrap();
        node.set_property("given", "Ada").await.unwrap();
        node.set_properties(props! { "given" => "Ada" }).await.unwrap();
        node.remove_property("died").await.unwrap();

        // THEN nothing is pending
        assert_eq!(node.status().await.unwrap(), Status::Clean);
        assert!(!graph.is_dirty());
    }

    // ========== TEST: set_properties_merges ==========
    #[tokio::test]
    async fn test_set_properties_merges() {
        let graph = repo("family").await;
        let node = graph.add_node("Person").await.unwrap();

        node.set_property("given", "Ada").await.unwrap();
        node.set_properties(props! { "born" => 1815, "titles" => vec!["Countess"] })
            .await
            .unwrap();

        assert_eq!(
            node.get_property_keys().await.unwrap(),
            vec!["born", "given", "titles"]
        );
        assert_eq!(
            node.get_property("born").await.unwrap(),
            Some(PropertyValue::Number(1815.0))
        );
    }

    // ========== TEST: invalid_writes_touch_nothing ==========
    #[tokio::test]
    async fn test_invalid_writes_touch_nothing() {
        // GIVEN a committed node
        let mut graph = repo("family").await;
        let id = graph.add_node("Person").await.unwrap().id().to_string();
        commit(&mut graph, "birth").await;
        let node = graph.get_node(&id).await.unwrap();

        // WHEN writing bad keys and values
        let bad_key = node.set_property("1st", "Ada").await;
        let reserved = node.set_property("_status", 2).await;
        let nan = node.set_property("born", f64::NAN).await;
        let empty = node.set_property("titles", Vec::<String>::new()).await;
        let bad_map = node
            .set_properties(props! { "given" => "Ada", "bad key" => 1 })
            .await;

        // THEN each is refused and the node stays clean
        assert_eq!(bad_key, Err(ValidationError::InvalidKey.into()));
        assert_eq!(reserved, Err(ValidationError::InvalidKey.into()));
        assert_eq!(nan, Err(ValidationError::InvalidValue.into()));
        assert_eq!(empty, Err(ValidationError::InvalidValue.into()));
        assert_eq!(bad_map, Err(ValidationError::InvalidKey.into()));
        assert_eq!(node.status().await.unwrap(), Status::Clean);
        assert!(!graph.is_dirty());
    }

    // ========== TEST: reserved_keys_stay_hidden ==========
    #[tokio::test]
    async fn test_reserved_keys_stay_hidden() {
        let mut graph = repo("family").await;
        let id = graph.add_node("Person").await.unwrap().id().to_string();
        commit(&mut graph, "birth").await;
        let node = graph.get_node(&id).await.unwrap();

        node.set_property("given", "Ada").await.unwrap();

        assert_eq!(node.get_property("_orig").await.unwrap(), None);
        assert_eq!(node.get_property("_status").await.unwrap(), None);
        assert_eq!(node.get_property_keys().await.unwrap(), vec!["given"]);
    }
}

mod boundaries {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: boundary_conversions_round_trip_through_reset ==========
    #[tokio::test]
    async fn test_boundary_conversions_round_trip_through_reset() {
        // GIVEN a committed regular node with properties
        let mut graph = repo("family").await;
        let id = graph.add_node("Person").await.unwrap().id().to_string();
        graph
            .get_node(&id)
            .await
            .unwrap()
            .set_property("given", "Ada")
            .await
            .unwrap();
        commit(&mut graph, "birth").await;
        let node = graph.get_node(&id).await.unwrap();

        // WHEN it is handed to another repo
        assert_eq!(
            node.convert_to_boundary("family").await,
            Err(ValidationError::InvalidRepo.into())
        );
        node.convert_to_boundary("census").await.unwrap();

        // THEN it behaves as a boundary
        assert!(node.is_boundary().await.unwrap());
        assert_eq!(node.get_repo().await.unwrap(), "census");
        assert_eq!(node.get_properties().await, Err(VGraphError::Boundary));
        assert_eq!(
            node.convert_to_boundary("parish").await,
            Err(VGraphError::AlreadyBoundary)
        );
        node.set_repo("parish").await.unwrap();
        assert_eq!(node.status().await.unwrap(), Status::Updated);

        // WHEN reset
        graph.reset().await.unwrap();

        // THEN the regular node comes back with its properties
        let node = graph.get_node(&id).await.unwrap();
        assert!(!node.is_boundary().await.unwrap());
        assert_eq!(node.get_repo().await.unwrap(), "family");
        assert_eq!(node.get_properties().await.unwrap(), props! { "given" => "Ada" });
        assert_eq!(node.set_repo("census").await, Err(VGraphError::NotBoundary));
        assert_eq!(node.convert_to_node().await, Err(VGraphError::AlreadyNode));
    }

    // ========== TEST: boundary_becomes_empty_node ==========
    #[tokio::test]
    async fn test_boundary_becomes_empty_node() {
        // GIVEN a committed boundary
        let mut graph = repo("family").await;
        let id = vgraph_core::generate_uuid_v4();
        graph.add_boundary(&id, "Person", "census").await.unwrap();
        let first = commit(&mut graph, "boundary").await;
        expect_commit(&first, |c| c.created(1).boundaries(1));

        // WHEN converting it into a regular node and committing
        let node = graph.get_node(&id).await.unwrap();
        node.convert_to_node().await.unwrap();
        assert_eq!(node.get_properties().await.unwrap(), props!());
        let second = commit(&mut graph, "adopt").await;

        // THEN the update records the boundary it replaced
        expect_commit(&second, |c| c.updated(1).boundaries(0));
        assert_eq!(
            second.nodes()[0].change(),
            &NodeChange::Update {
                state: NodeState::Regular(props!()),
                orig: NodeState::Boundary("census".to_string()),
            }
        );
    }
}

mod traversal {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========== TEST: traversal_skips_deleted_elements ==========
    #[tokio::test]
    async fn test_traversal_skips_deleted_elements() {
        // GIVEN a parent with two children
        let mut graph = repo("family").await;
        let parent = graph.add_node("Person").await.unwrap().id().to_string();
        let first = graph.add_node("Person").await.unwrap().id().to_string();
        let second = graph.add_node("Person").await.unwrap().id().to_string();
        graph.add_edge("Child", &parent, &first).await.unwrap();
        let to_second = graph
            .add_edge("Child", &parent, &second)
            .await
            .unwrap()
            .id()
            .to_string();
        graph.add_edge("Spouse", &first, &parent).await.unwrap();
        commit(&mut graph, "family").await;

        // WHEN one child edge is removed
        graph.remove_edge(&to_second).await.unwrap();

        // THEN traversal only sees live elements
        let node = graph.get_node(&parent).await.unwrap();
        let children = node.get_nodes(Direction::Out, &["Child"]).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id(), first);
        assert_eq!(node.get_edges(Direction::Both, &[]).await.unwrap().len(), 2);
        assert_eq!(node.get_edges(Direction::In, &["Spouse"]).await.unwrap().len(), 1);

        let edge = graph.get_edge(&to_second).await.unwrap();
        assert_eq!(edge.get_node(EdgeEnd::To).await.err(), Some(VGraphError::Deleted));
        let spouses = node.get_edges(Direction::In, &[]).await.unwrap();
        let spouse = &spouses[0];
        assert_eq!(spouse.get_node(EdgeEnd::From).await.unwrap().id(), first);
        assert_eq!(spouse.to_id(), parent);
    }
}
