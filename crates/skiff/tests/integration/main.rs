mod connection;
mod pods;
