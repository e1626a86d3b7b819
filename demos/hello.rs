//! Build the "hello" tree, print its root and the proof of the last block,
//! then check the proof. Run with `RUST_LOG=trace` to see the levels.

use merkle_inclusion::{verify_proof, DigestProvider, Error, Keccak256, MerkleTree};

fn main() -> Result<(), Error> {
    env_logger::init();

    let blocks: Vec<String> = (1..=7).map(|i| format!("hello{i}")).collect();
    let tree = MerkleTree::<Keccak256>::build(&blocks)?;
    println!("root: {}", tree.root_hash());

    let proof = tree.proof_for_index(6)?;
    for step in proof.steps() {
        println!("sibling: 0x{} ({:?})", hex::encode(&step.sibling), step.position);
    }

    let leaf = Keccak256::hash(blocks[6].as_bytes());
    println!(
        "verified: {}",
        verify_proof::<Keccak256>(&leaf, tree.root_hash(), proof.steps())?
    );
    Ok(())
}
