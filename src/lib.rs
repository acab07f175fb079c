//! Conversation-state core of the NexusAI chat widget, in a strictly linted crate.
//!
//! The crate tracks conversation sessions, persists them as a single JSON
//! blob under one storage key, exchanges messages with the remote assistant
//! endpoint, and projects transcripts into display models for an external
//! rendering surface.

// Interdiction stricte de pratiques dangereuses ou non idiomatiques
#![deny(warnings)] // Tous les warnings sont traités comme des erreurs
#![deny(unsafe_code)] // Le code unsafe est interdit
#![deny(missing_docs)] // Toute fonction, struct, enum ou module public doit être documenté
#![deny(dead_code)] // Le code inutilisé est interdit
#![deny(non_camel_case_types)]
// Options supplémentaires pour ne rien laisser passer
#![deny(unused_imports)] // Les imports inutilisés sont interdits
#![deny(unused_variables)] // Les variables inutilisés sont interdits
#![deny(unused_must_use)] // Oblige à gérer explicitement les Result et Option
#![deny(non_snake_case)] // Les noms de variables et fonctions doivent être en snake_case
#![deny(non_upper_case_globals)] // Les constantes et globals doivent être en MAJUSCULE
#![deny(nonstandard_style)] // Empêche tout style de code non standard
#![forbid(unsafe_op_in_unsafe_fn)]
// Clippy pour stricte discipline
#![deny(clippy::all)] // Active toutes les lints Clippy standard
#![deny(clippy::unwrap_used)] // Interdit unwrap()
#![deny(clippy::expect_used)] // Interdit expect()
#![deny(clippy::panic)] // Interdit panic!()
#![deny(clippy::print_stdout)] // Interdit println!() en production
#![deny(clippy::todo)] // Interdit les TODO dans le code
#![deny(clippy::unimplemented)] // Interdit les fonctions non implémentées
#![deny(clippy::module_inception)] // Interdit un module ayant le même nom que le crate

/// Widget configuration (endpoint, timeouts, environment overrides).
pub mod config;
/// Conversation identifiers, records, and the persisted store.
pub mod conversation;
/// Message dispatch to the remote assistant endpoint.
pub mod dispatch;
/// Inline markup formatting pipeline for assistant responses.
pub mod format;
/// Pure projections of conversation state into display models.
pub mod render;
/// Session orchestration: one user turn, conversation lifecycle, busy flag.
pub mod session;
/// Abstract persistent key-value storage and its backends.
pub mod storage;
