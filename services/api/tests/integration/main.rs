mod helpers;

mod wish_test;
