//! A genealogy shared between two archives.
//!
//! The parish archive records a family, the census archive clones it and
//! then both keep working: the census adds its own records linked to the
//! parish's people, ships them back as a copy and the parish merges them.

use pretty_assertions::assert_eq;
use vgraph_tests::prelude::*;

// ========== TEST: archives_exchange_history ==========
#[tokio::test]
async fn test_archives_exchange_history() {
    // GIVEN the parish records a marriage and a baptism
    let mut parish = repo("parish").await;
    let mother = parish.add_node("Person").await.unwrap().id().to_string();
    let father = parish.add_node("Person").await.unwrap().id().to_string();
    for (id, given) in [(&mother, "Annabella"), (&father, "George")] {
        parish
            .get_node(id)
            .await
            .unwrap()
            .set_property("given", given)
            .await
            .unwrap();
    }
    let marriage = parish.add_edge("Spouse", &mother, &father).await.unwrap().id().to_string();
    parish
        .get_edge(&marriage)
        .await
        .unwrap()
        .set_property("year", 1815)
        .await
        .unwrap();
    commit(&mut parish, "marriage").await;

    let ada = parish.add_node("Person").await.unwrap().id().to_string();
    parish
        .get_node(&ada)
        .await
        .unwrap()
        .set_property("given", "Ada")
        .await
        .unwrap();
    parish.add_edge("Child", &mother, &ada).await.unwrap();
    parish.add_edge("Child", &father, &ada).await.unwrap();
    let baptism = commit(&mut parish, "baptism").await;
    expect_commit(&baptism, |c| c.created(1).linked(2).referenced(2));

    // WHEN the census clones the parish
    let mut census = repo("census").await;
    for commit in parish.clone().await.unwrap() {
        census.patch(&commit).await.unwrap();
    }
    assert_eq!(census.info().unwrap().commit, parish.info().unwrap().commit);

    // AND records a household pointing at Ada, who it does not own
    let household = census.add_node("Household").await.unwrap().id().to_string();
    census
        .get_node(&household)
        .await
        .unwrap()
        .set_property("address", "St James's Square")
        .await
        .unwrap();
    census.add_edge("Member", &household, &ada).await.unwrap();
    census
        .get_node(&ada)
        .await
        .unwrap()
        .set_property("born", 1815)
        .await
        .unwrap();
    commit(&mut census, "household").await;

    // AND the parish meanwhile corrects the marriage year
    parish
        .get_edge(&marriage)
        .await
        .unwrap()
        .set_property("year", 1816)
        .await
        .unwrap();
    commit(&mut parish, "correction").await;

    // THEN the census copy of the household merges into the parish
    let copy = census
        .copy(AUTHOR, EMAIL, "household", Some(&[household.as_str(), ada.as_str()]))
        .await
        .unwrap();
    let merged = parish.merge(&copy).await.unwrap();
    expect_commit(&merged, |c| c.created(1).updated(1).linked(1));
    parish.patch(&merged).await.unwrap();

    let ada_node = parish.get_node(&ada).await.unwrap();
    assert_eq!(
        ada_node.get_properties().await.unwrap(),
        props! { "given" => "Ada", "born" => 1815 }
    );
    let members = ada_node.get_nodes(Direction::In, &["Member"]).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(
        members[0].get_property("address").await.unwrap(),
        Some(PropertyValue::from("St James's Square"))
    );
    assert_eq!(
        parish
            .get_edge(&marriage)
            .await
            .unwrap()
            .get_property("year")
            .await
            .unwrap(),
        Some(PropertyValue::from(1816))
    );

    // AND undoing the merge puts the parish back as it was
    let tip_before_merge = parish.log(1, 1).await.unwrap()[0].id().to_string();
    assert_eq!(
        parish.undo(&tip_before_merge).await.unwrap(),
        vec![merged.id().to_string()]
    );
    assert_eq!(parish.get_nodes(&["Household"]).await.unwrap().len(), 0);
    assert_eq!(
        parish.get_node(&ada).await.unwrap().get_properties().await.unwrap(),
        props! { "given" => "Ada" }
    );
    assert_eq!(root_incoming_count(parish.store()).await, 1);
}
