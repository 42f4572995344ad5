mod coordinator;
